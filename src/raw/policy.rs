use super::index::Index;
use super::node::{Dir, Link, Slot};
use super::store::Store;
use super::validate::Violation;
use crate::error::InsertError;

/// Decides which slot a new record lands in and what happens to a slot once its record leaves.
///
/// The balancing engine is identical for every policy. A policy only ever touches the tree
/// linkage when it relocates a live node.
pub(crate) trait SlotPolicy {
    /// A policy with no slots handed out.
    const EMPTY: Self;

    /// Places `record` in a fresh slot. The slot's node is an unlinked rank 0 leaf.
    ///
    /// On failure the record is handed back and neither the store nor the policy has changed.
    fn allocate<T>(&mut self, store: &mut Store<T>, record: T) -> Result<Index, InsertError<T>>;

    /// Takes back a slot the tree has already detached and returns its record.
    ///
    /// A policy that relocates another node into the vacated slot rewrites that node's neighbours
    /// and `root`.
    fn release<T>(&mut self, store: &mut Store<T>, root: &mut Index, slot: Index) -> T;

    /// Number of slots currently holding records.
    fn live<T>(&self, store: &Store<T>) -> usize;

    /// Forgets every slot after the store has been cleared.
    fn reset(&mut self);

    /// Marks slots owned by the policy in `reached` and checks that together with the live slots
    /// they cover the store exactly once.
    fn check_slots<T>(&self, store: &Store<T>, reached: &mut [bool]) -> Result<(), Violation>;
}

/// Swap-and-pop allocation.
///
/// Live records always occupy `[1, len)`. Removing a record moves the last record into the hole,
/// so indices of other records are not stable across removals.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Compact;

impl SlotPolicy for Compact {
    const EMPTY: Self = Compact;

    fn allocate<T>(&mut self, store: &mut Store<T>, record: T) -> Result<Index, InsertError<T>> {
        match store.make_room() {
            Ok(_) => Ok(store.push(Slot::live(record))),
            Err(error) => Err(InsertError::new(error, record)),
        }
    }

    fn release<T>(&mut self, store: &mut Store<T>, root: &mut Index, slot: Index) -> T {
        let last = Index::from_usize(store.len() - 1);
        let removed = store.swap_remove(slot);
        if slot != last {
            // The node formerly at `last` now lives at `slot`. Point its neighbours at it.
            let moved = *store.node(slot);
            let parent = moved.parent();
            if parent.is_nil() {
                *root = slot;
            } else {
                let parent = store.node_mut(parent);
                let dir = Dir::from_bool(parent.branch(Dir::Right) == last);
                parent.set_branch(dir, slot);
            }
            for child in moved.branches() {
                if !child.is_nil() {
                    store.node_mut(child).set_parent(slot);
                }
            }
        }
        removed.record.expect("`Compact::release()` - released slot holds no record!")
    }

    fn live<T>(&self, store: &Store<T>) -> usize {
        store.len().saturating_sub(1)
    }

    fn reset(&mut self) {}

    fn check_slots<T>(&self, store: &Store<T>, reached: &mut [bool]) -> Result<(), Violation> {
        if let Some(hole) = reached.iter().skip(1).position(|&seen| !seen) {
            return Err(Violation::Unreachable(hole + 1));
        }
        debug_assert_eq!(reached.len(), store.len());
        Ok(())
    }
}

/// Free-list allocation.
///
/// Released slots are pushed on a singly linked list threaded through [`Link::Free`] and are the
/// only slots ever reused. A live record keeps its index until it is removed, including across
/// growth of the store, which only appends new free slots.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FreeList {
    head: Index,
    live: usize,
}

impl FreeList {
    /// Threads every unused position of the store onto the free list in ascending order.
    fn thread_spare<T>(&mut self, store: &mut Store<T>, spare: usize) {
        let first = store.len();
        for offset in 1..=spare {
            let next = if offset == spare { self.head } else { Index::from_usize(first + offset) };
            store.push(Slot::free(next));
        }
        if spare > 0 {
            self.head = Index::from_usize(first);
        }
    }
}

impl SlotPolicy for FreeList {
    const EMPTY: Self = FreeList {
        head: Index::NIL,
        live: 0,
    };

    fn allocate<T>(&mut self, store: &mut Store<T>, record: T) -> Result<Index, InsertError<T>> {
        if self.head.is_nil() {
            match store.make_room() {
                Ok(spare) => self.thread_spare(store, spare),
                Err(error) => return Err(InsertError::new(error, record)),
            }
        }

        let slot = self.head;
        match store.node(slot).link() {
            Link::Free(next) => self.head = next,
            Link::Parent(_) => unreachable!("`FreeList::allocate()` - free list reached a live slot!"),
        }
        store.replace(slot, Slot::live(record));
        self.live += 1;
        Ok(slot)
    }

    fn release<T>(&mut self, store: &mut Store<T>, _root: &mut Index, slot: Index) -> T {
        let removed = store.replace(slot, Slot::free(self.head));
        self.head = slot;
        self.live -= 1;
        removed.record.expect("`FreeList::release()` - released slot holds no record!")
    }

    fn live<T>(&self, _store: &Store<T>) -> usize {
        self.live
    }

    fn reset(&mut self) {
        *self = Self::EMPTY;
    }

    fn check_slots<T>(&self, store: &Store<T>, reached: &mut [bool]) -> Result<(), Violation> {
        let mut cursor = self.head;
        while !cursor.is_nil() {
            let index = cursor.to_usize();
            let Some(node) = store.try_node(index) else {
                return Err(Violation::FreeListOutOfRange(index));
            };
            if reached[index] {
                return Err(Violation::SlotSharedOrCycle(index));
            }
            if store.try_record(index).is_some() {
                return Err(Violation::FreeSlotHoldsRecord(index));
            }
            reached[index] = true;
            cursor = match node.link() {
                Link::Free(next) => next,
                Link::Parent(_) => return Err(Violation::LiveSlotOnFreeList(index)),
            };
        }

        if let Some(hole) = reached.iter().skip(1).position(|&seen| !seen) {
            return Err(Violation::Unreachable(hole + 1));
        }
        Ok(())
    }
}
