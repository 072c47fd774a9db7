use super::FlatOrderedMap;
use crate::compare::Natural;
use crate::raw::{Growth, RawTree, Store};

impl<T, K: ?Sized> FlatOrderedMap<T, K> {
    /// Creates an empty, growable map with room for at least `capacity` slots.
    ///
    /// Slot counts include the sentinel, so `capacity` slots hold `capacity - 1` records before
    /// the first reallocation.
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
    /// let map = FlatOrderedMap::with_capacity(id, 32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(key_of: fn(&T) -> &K, capacity: usize) -> Self {
        FlatOrderedMap {
            raw: RawTree::with_store(Store::with_capacity(capacity, Growth::Unbounded), key_of, Natural),
        }
    }

    /// Creates an empty map with storage for exactly `capacity` slots that is never reallocated.
    ///
    /// Once `capacity - 1` records are stored, inserting a new key fails with
    /// [`Error::NoCapacity`](crate::Error::NoCapacity).
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn fixed(key_of: fn(&T) -> &K, capacity: usize) -> Self {
        Self::fixed_with_comparator(key_of, Natural, capacity)
    }
}

impl<T, K: ?Sized, C> FlatOrderedMap<T, K, C> {
    /// Like [`FlatOrderedMap::fixed`], ordered by `cmp`.
    #[must_use]
    pub fn fixed_with_comparator(key_of: fn(&T) -> &K, cmp: C, capacity: usize) -> Self {
        FlatOrderedMap {
            raw: RawTree::with_store(Store::fixed(capacity), key_of, cmp),
        }
    }

    /// Returns the number of slots the map can use without reallocating, sentinel included.
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
    /// let map = FlatOrderedMap::fixed(id, 32);
    /// assert_eq!(map.capacity(), 32);
    /// ```
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
