use core::cmp::Ordering;
use core::mem;

use super::index::Index;
use super::node::{Dir, Node};
use super::policy::SlotPolicy;
use super::store::{Growth, Store};
use crate::compare::Compare;
use crate::error::{Error, InsertError};

/// Where a key lives, or where it would be linked in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Search {
    /// The key is stored at this slot.
    Found(Index),
    /// The key is absent. A new node belongs in `parent.branch(dir)`, which is empty. `parent` is
    /// [`Index::NIL`] only for an empty tree.
    Vacant { parent: Index, dir: Dir },
}

/// The rank-balanced tree engine shared by every ordered map in the crate.
///
/// Nodes address each other by slot index, so the whole tree can be moved, cloned or grown
/// without fixing anything up. `P` decides how slots are handed out and taken back.
pub(crate) struct RawTree<T, K: ?Sized, C, P> {
    /// Node table and records.
    pub(super) store: Store<T>,
    /// Slot of the root, [`Index::NIL`] when empty.
    pub(super) root: Index,
    /// Slot allocation strategy.
    pub(super) policy: P,
    /// Locates the key inside a record.
    key_of: fn(&T) -> &K,
    /// Three-way key order.
    cmp: C,
    #[cfg(test)]
    pub(super) rotations: super::balance::Rotations,
}

impl<T: Clone, K: ?Sized, C: Clone, P: Clone> Clone for RawTree<T, K, C, P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            root: self.root,
            policy: self.policy.clone(),
            key_of: self.key_of,
            cmp: self.cmp.clone(),
            #[cfg(test)]
            rotations: self.rotations,
        }
    }
}

impl<T, K: ?Sized, C, P: SlotPolicy> RawTree<T, K, C, P> {
    /// Creates an empty tree. Nothing is allocated until the first insertion.
    pub(crate) const fn new(key_of: fn(&T) -> &K, cmp: C, growth: Growth) -> Self {
        Self::with_store(Store::new(growth), key_of, cmp)
    }

    pub(crate) const fn with_store(store: Store<T>, key_of: fn(&T) -> &K, cmp: C) -> Self {
        Self {
            store,
            root: Index::NIL,
            policy: P::EMPTY,
            key_of,
            cmp,
            #[cfg(test)]
            rotations: super::balance::Rotations::NONE,
        }
    }

    /// Number of records in the tree.
    pub(crate) fn len(&self) -> usize {
        self.policy.live(&self.store)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    /// Slots available without reallocating, sentinel included.
    pub(crate) fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub(crate) const fn growth(&self) -> Growth {
        self.store.growth()
    }

    pub(crate) const fn store(&self) -> &Store<T> {
        &self.store
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.cmp
    }

    #[inline]
    pub(crate) fn node(&self, index: Index) -> &Node {
        self.store.node(index)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, index: Index) -> &mut Node {
        self.store.node_mut(index)
    }

    #[inline]
    pub(crate) fn record(&self, index: Index) -> &T {
        self.store.record(index)
    }

    #[inline]
    pub(crate) fn record_mut(&mut self, index: Index) -> &mut T {
        self.store.record_mut(index)
    }

    /// The record at `index` if that slot currently holds one.
    pub(crate) fn try_record(&self, index: Index) -> Option<&T> {
        self.store.try_record(index.to_usize())
    }

    pub(crate) fn try_record_mut(&mut self, index: Index) -> Option<&mut T> {
        self.store.try_record_mut(index.to_usize())
    }

    #[inline]
    pub(crate) fn key_at(&self, index: Index) -> &K {
        (self.key_of)(self.store.record(index))
    }

    /// The key of a record that may live outside the tree.
    #[inline]
    pub(crate) fn key_of<'r>(&self, record: &'r T) -> &'r K {
        (self.key_of)(record)
    }

    /// Drops every record and keeps the storage.
    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.policy.reset();
        self.root = Index::NIL;
    }

    /// Drops every record and frees the storage.
    ///
    /// # Errors
    ///
    /// [`Error::NoAllocator`] for a fixed store, which is cleared but keeps its storage.
    pub(crate) fn clear_and_release(&mut self) -> Result<(), Error> {
        self.policy.reset();
        self.root = Index::NIL;
        self.store.release()
    }

    /// Links the freshly allocated leaf `slot` under `parent` and restores the rank rule.
    ///
    /// `parent` and `dir` come from a [`Search::Vacant`] obtained with no mutation in between.
    pub(crate) fn insert_at(&mut self, parent: Index, dir: Dir, slot: Index) {
        self.link_leaf(parent, dir, slot);
    }

    /// Unlinks `slot`, restores the rank rule and hands the slot back to the policy.
    ///
    /// Returns the record that lived there. Under the compact policy the last slot moves into
    /// `slot`.
    pub(crate) fn remove_at(&mut self, slot: Index) -> T {
        self.unlink(slot);
        self.policy.release(&mut self.store, &mut self.root, slot)
    }
}

impl<T, K: ?Sized, C: Compare<K>, P: SlotPolicy> RawTree<T, K, C, P> {
    #[inline]
    pub(crate) fn compare(&self, a: &K, b: &K) -> Ordering {
        self.cmp.compare(a, b)
    }

    /// Descends from the root looking for `key`.
    pub(crate) fn find(&self, key: &K) -> Search {
        let mut parent = Index::NIL;
        let mut dir = Dir::Left;
        let mut cursor = self.root;
        while !cursor.is_nil() {
            dir = match self.compare(key, self.key_at(cursor)) {
                Ordering::Equal => return Search::Found(cursor),
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
            };
            parent = cursor;
            cursor = self.node(cursor).branch(dir);
        }
        Search::Vacant { parent, dir }
    }

    /// Returns the slot holding `key`.
    pub(crate) fn get(&self, key: &K) -> Option<Index> {
        match self.find(key) {
            Search::Found(index) => Some(index),
            Search::Vacant { .. } => None,
        }
    }

    /// Allocates a slot for `record` and links it at a vacancy found by [`RawTree::find`].
    fn insert_vacant(&mut self, parent: Index, dir: Dir, record: T) -> Result<Index, InsertError<T>> {
        let slot = self.policy.allocate(&mut self.store, record)?;
        self.insert_at(parent, dir, slot);
        Ok(slot)
    }

    /// Stores `record`, swapping out a record with an equal key if present.
    ///
    /// Returns the record's slot and the displaced record.
    pub(crate) fn insert(&mut self, record: T) -> Result<(Index, Option<T>), InsertError<T>> {
        match self.find(self.key_of(&record)) {
            Search::Found(index) => Ok((index, Some(mem::replace(self.record_mut(index), record)))),
            Search::Vacant { parent, dir } => Ok((self.insert_vacant(parent, dir, record)?, None)),
        }
    }

    /// Stores `record` only if its key is absent.
    ///
    /// Returns the slot holding the key and, when the key was already present, the rejected
    /// record.
    pub(crate) fn try_insert(&mut self, record: T) -> Result<(Index, Option<T>), InsertError<T>> {
        match self.find(self.key_of(&record)) {
            Search::Found(index) => Ok((index, Some(record))),
            Search::Vacant { parent, dir } => Ok((self.insert_vacant(parent, dir, record)?, None)),
        }
    }

    /// Stores `record`, dropping a record with an equal key if present.
    pub(crate) fn insert_or_assign(&mut self, record: T) -> Result<Index, InsertError<T>> {
        match self.find(self.key_of(&record)) {
            Search::Found(index) => {
                *self.record_mut(index) = record;
                Ok(index)
            }
            Search::Vacant { parent, dir } => self.insert_vacant(parent, dir, record),
        }
    }

    /// Removes the record with `key`.
    pub(crate) fn remove(&mut self, key: &K) -> Option<T> {
        let index = self.get(key)?;
        Some(self.remove_at(index))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::compare::Natural;
    use crate::raw::policy::{Compact, FreeList};

    fn id(v: &i32) -> &i32 {
        v
    }

    type CompactTree = RawTree<i32, i32, Natural, Compact>;
    type HandleTree = RawTree<i32, i32, Natural, FreeList>;

    fn in_order<P: SlotPolicy>(tree: &RawTree<i32, i32, Natural, P>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut cursor = tree.first();
        while !cursor.is_nil() {
            keys.push(*tree.key_at(cursor));
            cursor = tree.successor(cursor);
        }
        keys
    }

    #[test]
    fn find_reports_vacancy() {
        let mut tree = CompactTree::new(id, Natural, Growth::Unbounded);
        assert_eq!(tree.find(&5), Search::Vacant { parent: Index::NIL, dir: Dir::Left });

        let (root, _) = tree.insert(5).unwrap();
        assert_eq!(tree.find(&5), Search::Found(root));
        assert_eq!(tree.find(&3), Search::Vacant { parent: root, dir: Dir::Left });
        assert_eq!(tree.find(&9), Search::Vacant { parent: root, dir: Dir::Right });
    }

    #[test]
    fn insert_swaps_and_try_insert_rejects() {
        let mut tree = HandleTree::new(id, Natural, Growth::Unbounded);
        let (slot, displaced) = tree.insert(1).unwrap();
        assert_eq!(displaced, None);

        let (again, displaced) = tree.insert(1).unwrap();
        assert_eq!(again, slot);
        assert_eq!(displaced, Some(1));

        let (again, rejected) = tree.try_insert(1).unwrap();
        assert_eq!(again, slot);
        assert_eq!(rejected, Some(1));
        assert_eq!(tree.len(), 1);
        assert!(tree.validate());
    }

    #[test]
    fn remove_returns_record() {
        let mut tree = CompactTree::new(id, Natural, Growth::Unbounded);
        for key in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert(key).unwrap();
        }
        assert_eq!(tree.remove(&4), Some(4));
        assert_eq!(tree.remove(&4), None);
        assert_eq!(in_order(&tree), [1, 2, 3, 5, 6, 7]);
        assert!(tree.validate());
    }

    #[test]
    fn ascending_and_descending_runs_stay_balanced() {
        let mut tree = HandleTree::new(id, Natural, Growth::Unbounded);
        for key in 0..256 {
            tree.insert(key).unwrap();
            assert_eq!(tree.check(), Ok(()));
        }
        for key in (-256..0).rev() {
            tree.insert(key).unwrap();
            assert_eq!(tree.check(), Ok(()));
        }
        assert_eq!(in_order(&tree), (-256..256).collect::<Vec<_>>());
        assert!(tree.height() <= 2 * 10);

        for key in (-256..256).step_by(2) {
            assert_eq!(tree.remove(&key), Some(key));
            assert_eq!(tree.check(), Ok(()));
        }
        assert_eq!(in_order(&tree), (-255..256).step_by(2).collect::<Vec<_>>());
    }

    #[test]
    fn failed_insert_leaves_tree_unchanged() {
        let mut tree = CompactTree::with_store(Store::fixed(4), id, Natural);
        for key in [2, 1, 3] {
            tree.insert(key).unwrap();
        }
        let err = tree.insert(4).unwrap_err();
        assert_eq!(err.error, Error::NoCapacity);
        assert_eq!(err.record, 4);
        assert_eq!(tree.len(), 3);
        assert_eq!(in_order(&tree), [1, 2, 3]);
        assert!(tree.validate());

        // Replacing an existing key needs no slot.
        assert_eq!(tree.insert(2).unwrap().1, Some(2));
    }

    #[test]
    fn clear_keeps_storage_and_release_frees_it() {
        let mut tree = HandleTree::with_store(Store::with_capacity(32, Growth::Unbounded), id, Natural);
        for key in 0..20 {
            tree.insert(key).unwrap();
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.capacity() >= 32);
        assert!(tree.validate());

        tree.insert(1).unwrap();
        assert_eq!(tree.clear_and_release(), Ok(()));
        assert_eq!(tree.capacity(), 0);
        assert!(tree.validate());
        tree.insert(2).unwrap();
        assert_eq!(in_order(&tree), [2]);
    }
}
