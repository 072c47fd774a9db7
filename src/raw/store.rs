use alloc::vec::Vec;

use super::index::Index;
use super::node::{Node, Slot};
use crate::error::Error;
use crate::trace::{debug_log, trace_log};

/// How a map's backing store may grow.
///
/// Slot counts include the sentinel at slot 0, so a store of `n` slots holds at most `n - 1`
/// records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Growth {
    /// Storage is reserved once at construction and never reallocated. A full store reports
    /// [`Error::NoCapacity`].
    Fixed,
    /// Storage grows geometrically for as long as the global allocator allows.
    #[default]
    Unbounded,
    /// Storage grows geometrically up to the given number of slots. Growing past it reports
    /// [`Error::AllocatorDenied`].
    Bounded(usize),
}

const MIN_GROWTH: usize = 8;
// Every slot must be addressable by an `Index`.
const MAX_SLOTS: usize = Index::MAX.saturating_add(1);

/// Contiguous slot storage with slot 0 reserved as the sentinel.
///
/// The store only knows about slots. Which slots are live, and how they link together, is the
/// business of the slot policy and the tree.
pub(crate) struct Store<T> {
    slots: Vec<Slot<T>>,
    growth: Growth,
    // Slot budget of a `Growth::Fixed` store.
    fixed: usize,
}

static SENTINEL: Node = Node::SENTINEL;

impl<T: Clone> Clone for Store<T> {
    /// The clone keeps the source capacity, so a fixed store stays allocation free.
    fn clone(&self) -> Self {
        let mut slots = Vec::with_capacity(self.slots.capacity());
        slots.extend(self.slots.iter().cloned());
        Self {
            slots,
            growth: self.growth,
            fixed: self.fixed,
        }
    }
}

impl<T> Store<T> {
    pub(crate) const fn new(growth: Growth) -> Self {
        Self {
            slots: Vec::new(),
            growth,
            fixed: 0,
        }
    }

    /// A growable store with room for `capacity` slots.
    pub(crate) fn with_capacity(capacity: usize, growth: Growth) -> Self {
        let mut store = Self {
            slots: Vec::with_capacity(capacity),
            growth,
            fixed: 0,
        };
        if capacity > 0 {
            store.slots.push(Slot::sentinel());
        }
        store
    }

    /// A store of exactly `capacity` slots that never reallocates.
    pub(crate) fn fixed(capacity: usize) -> Self {
        let mut store = Self::with_capacity(capacity, Growth::Fixed);
        store.fixed = capacity;
        store
    }

    pub(crate) const fn growth(&self) -> Growth {
        self.growth
    }

    /// Number of slots that can be used without reallocating, sentinel included.
    pub(crate) fn capacity(&self) -> usize {
        match self.growth {
            Growth::Fixed => self.fixed,
            Growth::Unbounded => self.slots.capacity(),
            Growth::Bounded(max) => self.slots.capacity().min(max),
        }
    }

    /// Number of slots in use, sentinel included. Zero before the first allocation.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn node(&self, index: Index) -> &Node {
        if index.is_nil() {
            return &SENTINEL;
        }
        &self.slots[index.to_usize()].node
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, index: Index) -> &mut Node {
        debug_assert!(!index.is_nil(), "`Store::node_mut()` - the sentinel is read-only!");
        &mut self.slots[index.to_usize()].node
    }

    /// Returns the node at `index` if that slot exists in the store.
    pub(crate) fn try_node(&self, index: usize) -> Option<&Node> {
        self.slots.get(index).map(|slot| &slot.node)
    }

    #[inline]
    pub(crate) fn record(&self, index: Index) -> &T {
        self.slots[index.to_usize()].record.as_ref().expect("`Store::record()` - slot holds no record!")
    }

    #[inline]
    pub(crate) fn record_mut(&mut self, index: Index) -> &mut T {
        self.slots[index.to_usize()].record.as_mut().expect("`Store::record_mut()` - slot holds no record!")
    }

    /// Returns the record at `index`, or `None` for the sentinel, a free slot, or an index past the
    /// end of the store.
    pub(crate) fn try_record(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(|slot| slot.record.as_ref())
    }

    pub(crate) fn try_record_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(|slot| slot.record.as_mut())
    }

    /// Installs `slot` at an existing position, returning what was there.
    pub(crate) fn replace(&mut self, index: Index, slot: Slot<T>) -> Slot<T> {
        debug_assert!(!index.is_nil(), "`Store::replace()` - the sentinel is read-only!");
        core::mem::replace(&mut self.slots[index.to_usize()], slot)
    }

    /// Appends `slot` after a successful [`Store::make_room`].
    pub(crate) fn push(&mut self, slot: Slot<T>) -> Index {
        debug_assert!(self.len() < self.capacity(), "`Store::push()` - no room was made!");
        self.slots.push(slot);
        Index::from_usize(self.slots.len() - 1)
    }

    /// Removes the slot at `index` and moves the last slot into its place.
    pub(crate) fn swap_remove(&mut self, index: Index) -> Slot<T> {
        debug_assert!(!index.is_nil(), "`Store::swap_remove()` - the sentinel is read-only!");
        self.slots.swap_remove(index.to_usize())
    }

    /// Guarantees at least one unused slot after the sentinel and returns how many there are.
    ///
    /// Growth follows the store's [`Growth`] policy. A failure leaves the store untouched.
    pub(crate) fn make_room(&mut self) -> Result<usize, Error> {
        // The sentinel is materialized together with the first record.
        let needed = self.slots.len().max(1) + 1;
        if needed > self.capacity() {
            self.grow(needed)?;
        }
        if self.slots.is_empty() {
            self.slots.push(Slot::sentinel());
        }
        Ok(self.capacity() - self.slots.len())
    }

    fn grow(&mut self, needed: usize) -> Result<(), Error> {
        let limit = match self.growth {
            Growth::Fixed => {
                trace_log!(capacity = self.fixed, "fixed backing store is full");
                return Err(Error::NoCapacity);
            }
            Growth::Unbounded => MAX_SLOTS,
            Growth::Bounded(max) => max.min(MAX_SLOTS),
        };
        if needed > limit {
            trace_log!(needed, limit, "growth limit reached");
            return Err(Error::AllocatorDenied);
        }

        let target = self.slots.capacity().saturating_mul(2).max(MIN_GROWTH).max(needed).min(limit);
        self.slots.try_reserve_exact(target - self.slots.len()).map_err(|_| {
            trace_log!(target, "allocator refused to grow the backing store");
            Error::AllocatorDenied
        })?;
        debug_log!(slots = self.slots.capacity(), "grew backing store");
        Ok(())
    }

    /// Drops every record and keeps the storage.
    pub(crate) fn clear(&mut self) {
        self.slots.truncate(1);
    }

    /// Drops every record and frees the storage.
    ///
    /// A fixed store has no allocation policy to hand the storage back to, so it is cleared and
    /// kept.
    pub(crate) fn release(&mut self) -> Result<(), Error> {
        if self.growth == Growth::Fixed {
            self.clear();
            return Err(Error::NoAllocator);
        }
        self.slots = Vec::new();
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store: Store<u32> = Store::new(Growth::Unbounded);
        assert_eq!(store.len(), 0);
        assert_eq!(store.capacity(), 0);
        assert!(store.node(Index::NIL).parity());
    }

    #[test]
    fn first_room_materializes_sentinel() {
        let mut store: Store<u32> = Store::new(Growth::Unbounded);
        let spare = store.make_room().unwrap();
        assert!(spare >= 1);
        assert_eq!(store.len(), 1);
        assert!(store.try_record(0).is_none());

        let index = store.push(Slot::live(5));
        assert_eq!(index.to_usize(), 1);
        assert_eq!(*store.record(index), 5);
    }

    #[test]
    fn fixed_store_reports_no_capacity() {
        let mut store: Store<u32> = Store::fixed(3);
        assert_eq!(store.capacity(), 3);
        for value in 0..2 {
            store.make_room().unwrap();
            store.push(Slot::live(value));
        }
        assert_eq!(store.make_room(), Err(Error::NoCapacity));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn bounded_store_reports_allocator_denied() {
        let mut store: Store<u32> = Store::new(Growth::Bounded(4));
        for value in 0..3 {
            store.make_room().unwrap();
            store.push(Slot::live(value));
        }
        assert_eq!(store.capacity(), 4);
        assert_eq!(store.make_room(), Err(Error::AllocatorDenied));
    }

    #[test]
    fn zero_slot_fixed_store_cannot_hold_the_sentinel() {
        let mut store: Store<u32> = Store::fixed(0);
        assert_eq!(store.make_room(), Err(Error::NoCapacity));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn swap_remove_moves_last_slot() {
        let mut store: Store<u32> = Store::with_capacity(8, Growth::Unbounded);
        for value in 10..13 {
            store.make_room().unwrap();
            store.push(Slot::live(value));
        }
        let removed = store.swap_remove(Index::from_usize(1));
        assert_eq!(removed.record, Some(10));
        assert_eq!(*store.record(Index::from_usize(1)), 12);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn release_frees_growable_storage_only() {
        let mut growable: Store<u32> = Store::with_capacity(16, Growth::Unbounded);
        growable.make_room().unwrap();
        growable.push(Slot::live(1));
        assert_eq!(growable.release(), Ok(()));
        assert_eq!(growable.capacity(), 0);
        assert_eq!(growable.len(), 0);

        let mut fixed: Store<u32> = Store::fixed(16);
        fixed.make_room().unwrap();
        fixed.push(Slot::live(1));
        assert_eq!(fixed.release(), Err(Error::NoAllocator));
        assert_eq!(fixed.capacity(), 16);
        assert_eq!(fixed.len(), 1);
    }
}
