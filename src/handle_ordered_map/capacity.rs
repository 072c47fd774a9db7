use super::HandleOrderedMap;
use crate::compare::Natural;
use crate::raw::{Growth, RawTree, Store};

impl<T, K: ?Sized> HandleOrderedMap<T, K> {
    /// Creates an empty, growable map with room for at least `capacity` slots, sentinel included.
    ///
    /// Growth appends free slots and never moves a live record to a different handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::HandleOrderedMap;
    ///
    /// fn id(v: &i32) -> &i32 {
    ///     v
    /// }
    ///
    /// let mut map = HandleOrderedMap::with_capacity(id, 2);
    /// let (first, _) = map.insert(1).unwrap();
    /// map.extend(2..100);
    /// assert_eq!(map.get_by_handle(first), Some(&1));
    /// assert!(map.capacity() >= 100);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(key_of: fn(&T) -> &K, capacity: usize) -> Self {
        HandleOrderedMap {
            raw: RawTree::with_store(Store::with_capacity(capacity, Growth::Unbounded), key_of, Natural),
        }
    }

    /// Creates an empty map with storage for exactly `capacity` slots that is never reallocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use flat_wavl::{Error, HandleOrderedMap};
    ///
    /// fn id(v: &i32) -> &i32 {
    ///     v
    /// }
    ///
    /// let mut map = HandleOrderedMap::fixed(id, 3);
    /// map.insert(1).unwrap();
    /// map.insert(2).unwrap();
    /// assert_eq!(map.insert(3).unwrap_err().error, Error::NoCapacity);
    ///
    /// // A freed slot is reused.
    /// map.remove(&1);
    /// assert!(map.insert(3).is_ok());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn fixed(key_of: fn(&T) -> &K, capacity: usize) -> Self {
        Self::fixed_with_comparator(key_of, Natural, capacity)
    }
}

impl<T, K: ?Sized, C> HandleOrderedMap<T, K, C> {
    /// Like [`HandleOrderedMap::fixed`], ordered by `cmp`.
    #[must_use]
    pub fn fixed_with_comparator(key_of: fn(&T) -> &K, cmp: C, capacity: usize) -> Self {
        HandleOrderedMap {
            raw: RawTree::with_store(Store::fixed(capacity), key_of, cmp),
        }
    }

    /// Returns the number of slots the map can use without reallocating, sentinel included.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns how the map's storage may grow.
    #[must_use]
    pub const fn growth(&self) -> Growth {
        self.raw.growth()
    }
}
