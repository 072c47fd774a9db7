use core::fmt;
use core::num::NonZero;

use crate::compare::{Compare, Natural};
use crate::error::{Error, InsertError};
use crate::iter::{Iter, Range, RangeRev};
use crate::raw::{FreeList, Growth, Index, RawTree, Violation};
use crate::try_insert::TryInsert;

mod capacity;

/// A stable reference to a record of a [`HandleOrderedMap`].
///
/// A handle keeps naming the same record across insertions and removals of other records and
/// across growth of the map's storage. Once its record is removed the handle is dead, and the
/// `*_by_handle` methods report it as such, until a later insertion reuses the slot. Handles are
/// not generation-checked: after reuse the handle names the new occupant.
///
/// `Option<Handle>` is the size of a `u32`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Handle(NonZero<u32>);

impl Handle {
    const fn from_index(index: Index) -> Option<Self> {
        match index.to_non_zero() {
            Some(raw) => Some(Handle(raw)),
            None => None,
        }
    }

    /// Slot position of the record in the backing store.
    #[must_use]
    pub const fn slot(self) -> usize {
        self.0.get() as usize
    }

    const fn index(self) -> Index {
        Index::from_non_zero(self.0)
    }
}

/// An ordered map whose records never move while they are in the map.
///
/// Like [`FlatOrderedMap`](crate::FlatOrderedMap), records of type `T` live in one contiguous
/// buffer and are ordered by the key `key_of` finds inside them, compared with `C`. Removed slots
/// go on a free list and are the only slots reused, so every record is reachable through the
/// [`Handle`] returned when it was inserted until it is removed.
///
/// # Examples
///
/// ```
/// use flat_wavl::HandleOrderedMap;
///
/// fn key<'a>(entry: &'a (u32, &'static str)) -> &'a u32 {
///     &entry.0
/// }
///
/// let mut tasks = HandleOrderedMap::new(key);
/// let (write, _) = tasks.insert((20, "write")).unwrap();
/// let (plan, _) = tasks.insert((10, "plan")).unwrap();
/// tasks.insert((30, "ship")).unwrap();
///
/// // Unrelated removals and growth never invalidate a handle.
/// tasks.remove(&30);
/// for key in 100..200 {
///     tasks.insert((key, "later")).unwrap();
/// }
/// assert_eq!(tasks.get_by_handle(write), Some(&(20, "write")));
///
/// // Handles walk the map in key order.
/// assert_eq!(tasks.successor(plan), Ok(Some(write)));
/// assert_eq!(tasks.predecessor(plan), Ok(None));
///
/// assert_eq!(tasks.remove_by_handle(plan), Ok((10, "plan")));
/// assert!(tasks.get_by_handle(plan).is_none());
/// ```
pub struct HandleOrderedMap<T, K: ?Sized, C = Natural> {
    raw: RawTree<T, K, C, FreeList>,
}

impl<T, K: ?Sized> HandleOrderedMap<T, K> {
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

impl<T, K: ?Sized, C> HandleOrderedMap<T, K, C> {
    /// Makes a new, empty map ordered by `cmp`.
    #[must_use]
    pub const fn with_comparator(key_of: fn(&T) -> &K, cmp: C) -> Self {
        Self::with_growth(key_of, cmp, Growth::Unbounded)
    }

    /// Makes a new, empty map ordered by `cmp` that grows according to `growth`.
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

    /// Returns the handle of the first record in key order.
    #[must_use]
    pub fn first_handle(&self) -> Option<Handle> {
        Handle::from_index(self.raw.first())
    }

    /// Returns the handle of the last record in key order.
    #[must_use]
    pub fn last_handle(&self) -> Option<Handle> {
        Handle::from_index(self.raw.last())
    }

    /// Returns the record `handle` names, or `None` if the handle is dead.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn get_by_handle(&self, handle: Handle) -> Option<&T> {
        self.raw.try_record(handle.index())
    }

    /// Returns the record `handle` names mutably, or `None` if the handle is dead.
    ///
    /// The key inside the record must keep its ordering relative to every other key.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn get_by_handle_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.raw.try_record_mut(handle.index())
    }

    /// Removes the record `handle` names. The slot goes on the free list.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if the handle is dead. The map is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n); at most two rotations.
    pub fn remove_by_handle(&mut self, handle: Handle) -> Result<T, Error> {
        let index = self.live(handle)?;
        Ok(self.raw.remove_at(index))
    }

    /// Returns the handle of the next record in key order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if the handle is dead.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, O(1) amortized over a full walk.
    pub fn successor(&self, handle: Handle) -> Result<Option<Handle>, Error> {
        let index = self.live(handle)?;
        Ok(Handle::from_index(self.raw.successor(index)))
    }

    /// Returns the handle of the previous record in key order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if the handle is dead.
    ///
    /// # Complexity
    ///
    /// O(log n) worst case, O(1) amortized over a full walk.
    pub fn predecessor(&self, handle: Handle) -> Result<Option<Handle>, Error> {
        let index = self.live(handle)?;
        Ok(Handle::from_index(self.raw.predecessor(index)))
    }

    /// Gets an iterator over the records of the map, in key order.
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) amortized per step.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.raw.store(), self.raw.span(), self.len())
    }

    /// Clears the map, removing all records. The storage is kept for reuse and every handle
    /// becomes dead.
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
    /// [`Error::NoAllocator`] if the map was built with [`HandleOrderedMap::fixed`]. The map is
    /// still cleared, but keeps its storage.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear_and_release(&mut self) -> Result<(), Error> {
        self.raw.clear_and_release()
    }

    fn live(&self, handle: Handle) -> Result<Index, Error> {
        let index = handle.index();
        match self.raw.try_record(index) {
            Some(_) => Ok(index),
            None => Err(Error::InvalidHandle),
        }
    }
}

impl<T, K: ?Sized, C: Compare<K>> HandleOrderedMap<T, K, C> {
    /// Returns a reference to the record with `key`.
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

    /// Returns the handle of the record with `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn handle_of(&self, key: &K) -> Option<Handle> {
        self.raw.get(key).and_then(Handle::from_index)
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
    /// Returns the handle of the stored record. A replaced record keeps its handle.
    ///
    /// # Errors
    ///
    /// When the key is absent and no slot can be obtained the record is handed back in an
    /// [`InsertError`] and the map is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n); amortized O(1) rebalancing.
    pub fn insert(&mut self, record: T) -> Result<(Handle, Option<T>), InsertError<T>> {
        let (index, displaced) = self.raw.insert(record)?;
        Ok((self.handle(index), displaced))
    }

    /// Inserts `record` only if its key is absent. An existing record is never overwritten.
    ///
    /// # Errors
    ///
    /// When the key is absent and no slot can be obtained the record is handed back in an
    /// [`InsertError`] and the map is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::{HandleOrderedMap, TryInsert};
    ///
    /// fn key(entry: &(u8, u8)) -> &u8 {
    ///     &entry.0
    /// }
    ///
    /// let mut map = HandleOrderedMap::new(key);
    /// let TryInsert::Inserted(handle) = map.try_insert((1, 10)).unwrap() else {
    ///     panic!("1 was absent");
    /// };
    /// assert_eq!(map.try_insert((1, 20)).unwrap(), TryInsert::Present(handle, (1, 20)));
    /// assert_eq!(map.get_by_handle(handle), Some(&(1, 10)));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn try_insert(&mut self, record: T) -> Result<TryInsert<Handle, T>, InsertError<T>> {
        let (index, rejected) = self.raw.try_insert(record)?;
        let handle = self.handle(index);
        Ok(match rejected {
            None => TryInsert::Inserted(handle),
            Some(rejected) => TryInsert::Present(handle, rejected),
        })
    }

    /// Inserts `record`, dropping any record with the same key, and returns its handle.
    ///
    /// # Errors
    ///
    /// When the key is absent and no slot can be obtained the record is handed back in an
    /// [`InsertError`] and the map is unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert_or_assign(&mut self, record: T) -> Result<Handle, InsertError<T>> {
        let index = self.raw.insert_or_assign(record)?;
        Ok(self.handle(index))
    }

    /// Removes and returns the record with `key`. Its handle becomes dead.
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
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) amortized per step.
    pub fn range_rev(&self, rbegin: &K, rend: &K) -> RangeRev<'_, T> {
        RangeRev::new(self.raw.store(), self.raw.range_rev_span(rbegin, rend))
    }

    /// Checks every structural invariant of the map, including that live and free slots
    /// partition the storage.
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
    #[must_use]
    pub fn validate(&self) -> bool {
        self.raw.validate()
    }

    /// Live slots are never the sentinel.
    fn handle(&self, index: Index) -> Handle {
        debug_assert!(self.raw.try_record(index).is_some());
        match Handle::from_index(index) {
            Some(handle) => handle,
            None => unreachable!("`HandleOrderedMap::handle()` - record stored in the sentinel!"),
        }
    }
}

impl<T: Clone, K: ?Sized, C: Clone> Clone for HandleOrderedMap<T, K, C> {
    /// Clones the map. Handles of `self` name the same records in the clone.
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<T: fmt::Debug, K: ?Sized, C> fmt::Debug for HandleOrderedMap<T, K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, K: ?Sized, C: Compare<K>> Extend<T> for HandleOrderedMap<T, K, C> {
    /// Inserts every record, replacing records with equal keys.
    ///
    /// # Panics
    ///
    /// Panics if a slot cannot be obtained. Use [`HandleOrderedMap::insert`] to handle a full
    /// store.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for record in iter {
            if let Err(err) = self.insert(record) {
                panic!("`HandleOrderedMap::extend()` - {}", err.error);
            }
        }
    }
}

impl<'a, T, K: ?Sized, C> IntoIterator for &'a HandleOrderedMap<T, K, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Option<Handle>, u32);

    fn id(v: &u32) -> &u32 {
        v
    }

    #[test]
    fn slot_positions_start_after_the_sentinel() {
        let mut map = HandleOrderedMap::new(id);
        let (a, _) = map.insert(7).unwrap();
        let (b, _) = map.insert(3).unwrap();
        assert_eq!(a.slot(), 1);
        assert_eq!(b.slot(), 2);
    }

    #[test]
    fn dead_handles_are_rejected() {
        let mut map = HandleOrderedMap::new(id);
        let (handle, _) = map.insert(7).unwrap();
        assert_eq!(map.remove(&7), Some(7));
        assert_eq!(map.remove_by_handle(handle), Err(Error::InvalidHandle));
        assert_eq!(map.successor(handle), Err(Error::InvalidHandle));
        assert_eq!(map.predecessor(handle), Err(Error::InvalidHandle));
        assert!(map.get_by_handle_mut(handle).is_none());

        // Past the end of the storage.
        let far = Handle(NonZero::new(1_000).unwrap());
        assert_eq!(map.remove_by_handle(far), Err(Error::InvalidHandle));
        assert!(map.validate());
    }
}
