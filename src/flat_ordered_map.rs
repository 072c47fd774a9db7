use core::fmt;

use crate::compare::{Compare, Natural};
use crate::error::{Error, InsertError};
use crate::iter::{Iter, Range, RangeRev};
use crate::raw::{Compact, Growth, RawTree, Violation};
use crate::try_insert::TryInsert;

mod capacity;

/// An ordered map whose records live packed in one contiguous buffer.
///
/// Records of type `T` are kept in key order, where the key is found inside each record by the
/// `key_of` function given at construction and compared with `C`. The tree is a [WAVL tree]:
/// lookups, insertions and removals are O(log n), an insertion performs at most one (single or
/// double) rotation and a removal at most two.
///
/// Nodes address each other by slot index rather than by pointer, so the whole map can be moved
/// or reallocated without touching a link. Removal moves the last record into the vacated slot to
/// keep the buffer packed. If you need records to stay put, use
/// [`HandleOrderedMap`](crate::HandleOrderedMap).
///
/// It is a logic error for a record's key to be modified in such a way that its ordering relative
/// to any other key changes while it is in the map. The behavior resulting from such a logic
/// error is not specified, but will be encapsulated to the map that observed it and not result
/// in undefined behavior.
///
/// # Examples
///
/// ```
/// use flat_wavl::FlatOrderedMap;
///
/// #[derive(Debug, PartialEq)]
/// struct Planet {
///     name: &'static str,
///     distance: u32,
/// }
///
/// fn distance(planet: &Planet) -> &u32 {
///     &planet.distance
/// }
///
/// let mut planets = FlatOrderedMap::new(distance);
/// planets.insert(Planet { name: "Mars", distance: 228 }).unwrap();
/// planets.insert(Planet { name: "Earth", distance: 150 }).unwrap();
/// planets.insert(Planet { name: "Venus", distance: 108 }).unwrap();
///
/// assert_eq!(planets.get(&150).map(|p| p.name), Some("Earth"));
///
/// let names: Vec<_> = planets.iter().map(|p| p.name).collect();
/// assert_eq!(names, ["Venus", "Earth", "Mars"]);
///
/// let inner: Vec<_> = planets.range(&100, &200).map(|p| p.name).collect();
/// assert_eq!(inner, ["Venus", "Earth"]);
/// ```
///
/// A map built with [`FlatOrderedMap::fixed`] never reallocates and reports a full store instead:
///
/// ```
/// use flat_wavl::{Error, FlatOrderedMap};
///
/// fn id(v: &i64) -> &i64 {
///     v
/// }
///
/// let mut map = FlatOrderedMap::fixed(id, 4);
/// for key in [10, 20, 30] {
///     map.insert(key).unwrap();
/// }
/// assert_eq!(map.insert(40).unwrap_err().error, Error::NoCapacity);
/// assert_eq!(map.len(), 3);
/// ```
///
/// [WAVL tree]: https://en.wikipedia.org/wiki/WAVL_tree
pub struct FlatOrderedMap<T, K: ?Sized, C = Natural> {
    raw: RawTree<T, K, C, Compact>,
}

impl<T, K: ?Sized> FlatOrderedMap<T, K> {
    /// Makes a new, empty map ordered by the keys' [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn new(key_of: fn(&T) -> &K) -> Self {
        Self::with_comparator(key_of, Natural)
    }
}

impl<T, K: ?Sized, C> FlatOrderedMap<T, K, C> {
    /// Makes a new, empty map ordered by `cmp`.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn with_comparator(key_of: fn(&T) -> &K, cmp: C) -> Self {
        Self::with_growth(key_of, cmp, Growth::Unbounded)
    }

    /// Makes a new, empty map ordered by `cmp` that grows according to `growth`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::{Error, FlatOrderedMap, Growth, Natural};
    ///
    /// fn id(v: &u16) -> &u16 {
    ///     v
    /// }
    ///
    /// // At most 16 slots, one of which is the sentinel.
    /// let mut map = FlatOrderedMap::with_growth(id, Natural, Growth::Bounded(16));
    /// for key in 0..15 {
    ///     map.insert(key).unwrap();
    /// }
    /// assert_eq!(map.insert(15).unwrap_err().error, Error::AllocatorDenied);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn with_growth(key_of: fn(&T) -> &K, cmp: C, growth: Growth) -> Self {
        Self {
            raw: RawTree::new(key_of, cmp, growth),
        }
    }

    /// Returns the number of records in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no records.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the comparator ordering the map.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Returns the first record in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::FlatOrderedMap;
    ///
    /// fn id(v: &char) -> &char {
    ///     v
    /// }
    ///
    /// let mut map = FlatOrderedMap::new(id);
    /// assert_eq!(map.first(), None);
    /// map.extend(['q', 'c', 'x']);
    /// assert_eq!(map.first(), Some(&'c'));
    /// assert_eq!(map.last(), Some(&'x'));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.try_record(self.raw.first())
    }

    /// Returns the last record in key order.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.try_record(self.raw.last())
    }

    /// Removes and returns the first record in key order.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<T> {
        let first = self.raw.first();
        (!first.is_nil()).then(|| self.raw.remove_at(first))
    }

    /// Removes and returns the last record in key order.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<T> {
        let last = self.raw.last();
        (!last.is_nil()).then(|| self.raw.remove_at(last))
    }

    /// Gets an iterator over the records of the map, in key order.
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) amortized per step.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.raw.store(), self.raw.span(), self.len())
    }

    /// Clears the map, removing all records. The storage is kept for reuse.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Clears the map and frees its storage.
    ///
    /// # Errors
    ///
    /// [`Error::NoAllocator`] if the map was built with [`FlatOrderedMap::fixed`]. The map is still
    /// cleared, but keeps its storage.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::{Error, FlatOrderedMap};
    ///
    /// fn id(v: &u8) -> &u8 {
    ///     v
    /// }
    ///
    /// let mut growable = FlatOrderedMap::with_capacity(id, 64);
    /// growable.insert(1).unwrap();
    /// assert_eq!(growable.clear_and_release(), Ok(()));
    /// assert_eq!(growable.capacity(), 0);
    ///
    /// let mut fixed = FlatOrderedMap::fixed(id, 64);
    /// fixed.insert(1).unwrap();
    /// assert_eq!(fixed.clear_and_release(), Err(Error::NoAllocator));
    /// assert!(fixed.is_empty());
    /// assert_eq!(fixed.capacity(), 64);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear_and_release(&mut self) -> Result<(), Error> {
        self.raw.clear_and_release()
    }
}

impl<T, K: ?Sized, C: Compare<K>> FlatOrderedMap<T, K, C> {
    /// Returns a reference to the record with `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::FlatOrderedMap;
    ///
    /// fn key<'a>(entry: &'a (u32, &'static str)) -> &'a u32 {
    ///     &entry.0
    /// }
    ///
    /// let mut map = FlatOrderedMap::new(key);
    /// map.insert((1, "a")).unwrap();
    /// assert_eq!(map.get(&1), Some(&(1, "a")));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get(&self, key: &K) -> Option<&T> {
        self.raw.get(key).map(|index| self.raw.record(index))
    }

    /// Returns a mutable reference to the record with `key`.
    ///
    /// The key inside the record must keep its ordering relative to every other key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut(&mut self, key: &K) -> Option<&mut T> {
        let index = self.raw.get(key)?;
        Some(self.raw.record_mut(index))
    }

    /// Returns `true` if the map contains a record with `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.get(key).is_some()
    }

    /// Inserts `record`, replacing and returning any record with the same key.
    ///
    /// # Errors
    ///
    /// When the key is absent and no slot can be obtained the record is handed back in an
    /// [`InsertError`] and the map is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::FlatOrderedMap;
    ///
    /// fn key<'a>(entry: &'a (u32, &'static str)) -> &'a u32 {
    ///     &entry.0
    /// }
    ///
    /// let mut map = FlatOrderedMap::new(key);
    /// assert_eq!(map.insert((37, "a")), Ok(None));
    /// assert_eq!(map.insert((37, "b")), Ok(Some((37, "a"))));
    /// assert_eq!(map.get(&37), Some(&(37, "b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n); amortized O(1) rebalancing.
    pub fn insert(&mut self, record: T) -> Result<Option<T>, InsertError<T>> {
        self.raw.insert(record).map(|(_, displaced)| displaced)
    }

    /// Inserts `record` only if its key is absent. An existing record is never overwritten.
    ///
    /// # Errors
    ///
    /// When the key is absent and no slot can be obtained the record is handed back in an
    /// [`InsertError`] and the map is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn try_insert(&mut self, record: T) -> Result<TryInsert<&mut T, T>, InsertError<T>> {
        let (index, rejected) = self.raw.try_insert(record)?;
        let current = self.raw.record_mut(index);
        Ok(match rejected {
            None => TryInsert::Inserted(current),
            Some(rejected) => TryInsert::Present(current, rejected),
        })
    }

    /// Inserts `record`, dropping any record with the same key, and returns the stored record.
    ///
    /// # Errors
    ///
    /// When the key is absent and no slot can be obtained the record is handed back in an
    /// [`InsertError`] and the map is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::FlatOrderedMap;
    ///
    /// fn key(entry: &(char, u32)) -> &char {
    ///     &entry.0
    /// }
    ///
    /// let mut counts = FlatOrderedMap::new(key);
    /// counts.insert_or_assign(('a', 1)).unwrap();
    /// counts.insert_or_assign(('a', 5)).unwrap().1 += 1;
    /// assert_eq!(counts.get(&'a'), Some(&('a', 6)));
    /// assert_eq!(counts.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_or_assign(&mut self, record: T) -> Result<&mut T, InsertError<T>> {
        let index = self.raw.insert_or_assign(record)?;
        Ok(self.raw.record_mut(index))
    }

    /// Removes and returns the record with `key`.
    ///
    /// The last record in the buffer moves into the freed slot.
    ///
    /// # Complexity
    ///
    /// O(log n); at most two rotations.
    pub fn remove(&mut self, key: &K) -> Option<T> {
        self.raw.remove(key)
    }

    /// Gets an iterator over the records with keys in `[begin, end]`, in ascending order.
    ///
    /// The range is empty when `begin` orders after `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::FlatOrderedMap;
    ///
    /// fn id(v: &i32) -> &i32 {
    ///     v
    /// }
    ///
    /// let mut map = FlatOrderedMap::new(id);
    /// map.extend([5, 1, 8, 3, 9]);
    /// assert!(map.range(&2, &8).eq(&[3, 5, 8]));
    /// assert!(map.range(&2, &8).rev().eq(&[8, 5, 3]));
    /// assert_eq!(map.range(&8, &2).next(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) amortized per step.
    pub fn range(&self, begin: &K, end: &K) -> Range<'_, T> {
        Range::new(self.raw.store(), self.raw.range_span(begin, end))
    }

    /// Gets an iterator over the records with keys in `[rend, rbegin]`, in descending order.
    ///
    /// The range is empty when `rbegin` orders before `rend`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::FlatOrderedMap;
    ///
    /// fn id(v: &i32) -> &i32 {
    ///     v
    /// }
    ///
    /// let mut map = FlatOrderedMap::new(id);
    /// map.extend([5, 1, 8, 3, 9]);
    /// assert!(map.range_rev(&8, &2).eq(&[8, 5, 3]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) amortized per step.
    pub fn range_rev(&self, rbegin: &K, rend: &K) -> RangeRev<'_, T> {
        RangeRev::new(self.raw.store(), self.raw.range_rev_span(rbegin, rend))
    }

    /// Checks every structural invariant of the map.
    ///
    /// # Errors
    ///
    /// The first [`Violation`] found. A violation is a bug in this crate.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn check(&self) -> Result<(), Violation> {
        self.raw.check()
    }

    /// Returns `true` if every structural invariant holds.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn validate(&self) -> bool {
        self.raw.validate()
    }
}

impl<T: Clone, K: ?Sized, C: Clone> Clone for FlatOrderedMap<T, K, C> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<T: fmt::Debug, K: ?Sized, C> fmt::Debug for FlatOrderedMap<T, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, K: ?Sized, C: Compare<K>> Extend<T> for FlatOrderedMap<T, K, C> {
    /// Inserts every record, replacing records with equal keys.
    ///
    /// # Panics
    ///
    /// Panics if a slot cannot be obtained, like the standard collections do when allocation
    /// fails. Use [`FlatOrderedMap::insert`] to handle a full store.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for record in iter {
            if let Err(err) = self.insert(record) {
                panic!("`FlatOrderedMap::extend()` - {}", err.error);
            }
        }
    }
}

impl<'a, T, K: ?Sized, C> IntoIterator for &'a FlatOrderedMap<T, K, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
