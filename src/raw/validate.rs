//! Structural invariant checker.
//!
//! Only tests and debug assertions call into this module. A violation always means a bug in the
//! engine, never bad input.

use alloc::vec;

use thiserror::Error;

use super::index::Index;
use super::node::Link;
use super::policy::SlotPolicy;
use super::tree::RawTree;
use crate::compare::Compare;

/// The first broken invariant found by a map's `check` method. Slot positions are reported as
/// plain indices into the backing store.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
#[non_exhaustive]
pub enum Violation {
    #[error("root {0} has a parent")]
    RootHasParent(usize),
    #[error("slot {0} is past the end of the backing store")]
    OutOfRange(usize),
    #[error("slot {0} is reached twice")]
    SlotSharedOrCycle(usize),
    #[error("live slot {0} holds no record")]
    MissingRecord(usize),
    #[error("slot {0} is linked into the tree but marked free")]
    FreeSlotInTree(usize),
    #[error("slot {child} names {found} as parent instead of {expected}")]
    ParentMismatch { child: usize, expected: usize, found: usize },
    #[error("key at slot {0} is out of order")]
    OutOfOrder(usize),
    #[error("children of slot {0} break the rank rule")]
    RankRule(usize),
    #[error("leaf at slot {0} does not have rank 0")]
    LeafRank(usize),
    #[error("{reached} nodes reachable but {live} records live")]
    SizeMismatch { reached: usize, live: usize },
    #[error("slot {0} is neither live nor free")]
    Unreachable(usize),
    #[error("free list runs past the end of the backing store at {0}")]
    FreeListOutOfRange(usize),
    #[error("free slot {0} still holds a record")]
    FreeSlotHoldsRecord(usize),
    #[error("free list reaches live slot {0}")]
    LiveSlotOnFreeList(usize),
}

/// Bounds on the keys of a subtree, as slots holding the exclusive low and high keys.
#[derive(Clone, Copy)]
struct Bounds {
    low: Index,
    high: Index,
}

impl<T, K: ?Sized, C: Compare<K>, P: SlotPolicy> RawTree<T, K, C, P> {
    /// Checks ordering, the rank rule, parent links, size agreement and slot ownership, in that
    /// order for every subtree.
    ///
    /// # Errors
    ///
    /// The first [`Violation`] found.
    pub(crate) fn check(&self) -> Result<(), Violation> {
        let mut reached = vec![false; self.store.len()];
        if let Some(sentinel) = reached.first_mut() {
            *sentinel = true;
        }

        if !self.root.is_nil() {
            let index = self.root.to_usize();
            if let Some(node) = self.store.try_node(index)
                && node.link() != Link::Parent(Index::NIL)
            {
                return Err(Violation::RootHasParent(index));
            }
        }

        let mut count = 0;
        let bounds = Bounds {
            low: Index::NIL,
            high: Index::NIL,
        };
        self.check_subtree(self.root, Index::NIL, bounds, &mut reached, &mut count)?;

        let live = self.len();
        if count != live {
            return Err(Violation::SizeMismatch { reached: count, live });
        }
        self.policy.check_slots(&self.store, &mut reached)
    }

    /// Returns `true` when every invariant holds.
    pub(crate) fn validate(&self) -> bool {
        self.check().is_ok()
    }

    /// Checks the subtree at `index` and returns its reconstructed integer rank, -1 for `NIL`.
    ///
    /// Recursion depth is bounded by the tree height, at most `2 log2(n)`.
    fn check_subtree(
        &self,
        index: Index,
        parent: Index,
        bounds: Bounds,
        reached: &mut [bool],
        count: &mut usize,
    ) -> Result<i64, Violation> {
        if index.is_nil() {
            return Ok(-1);
        }
        let at = index.to_usize();
        let Some(node) = self.store.try_node(at) else {
            return Err(Violation::OutOfRange(at));
        };
        if reached[at] {
            return Err(Violation::SlotSharedOrCycle(at));
        }
        reached[at] = true;
        *count += 1;

        match node.link() {
            Link::Free(_) => return Err(Violation::FreeSlotInTree(at)),
            Link::Parent(found) if found != parent => {
                return Err(Violation::ParentMismatch {
                    child: at,
                    expected: parent.to_usize(),
                    found: found.to_usize(),
                });
            }
            Link::Parent(_) => {}
        }
        let Some(record) = self.try_record(index) else {
            return Err(Violation::MissingRecord(at));
        };

        let key = self.key_of(record);
        let above_low = bounds.low.is_nil() || self.compare(key, self.key_at(bounds.low)).is_gt();
        let below_high = bounds.high.is_nil() || self.compare(key, self.key_at(bounds.high)).is_lt();
        if !above_low || !below_high {
            return Err(Violation::OutOfOrder(at));
        }

        let [left, right] = node.branches();
        let left_rank = self.check_subtree(left, index, Bounds { high: index, ..bounds }, reached, count)?;
        let right_rank = self.check_subtree(right, index, Bounds { low: index, ..bounds }, reached, count)?;

        // A child of equal parity sits two ranks below, otherwise one.
        let parity = node.parity();
        let rank_over = |child: Index, rank: i64| rank + if self.node(child).parity() == parity { 2 } else { 1 };
        let rank = rank_over(left, left_rank);
        if rank != rank_over(right, right_rank) {
            return Err(Violation::RankRule(at));
        }
        if node.is_leaf() && rank != 0 {
            return Err(Violation::LeafRank(at));
        }
        Ok(rank)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::Natural;
    use crate::raw::node::Dir;
    use crate::raw::policy::{Compact, FreeList};
    use crate::raw::store::Growth;

    fn id(v: &u32) -> &u32 {
        v
    }

    fn build<P: SlotPolicy>(keys: &[u32]) -> RawTree<u32, u32, Natural, P> {
        let mut tree = RawTree::new(id, Natural, Growth::Unbounded);
        for &key in keys {
            tree.insert(key).unwrap();
        }
        tree
    }

    #[test]
    fn empty_trees_are_valid() {
        assert_eq!(build::<Compact>(&[]).check(), Ok(()));
        assert_eq!(build::<FreeList>(&[]).check(), Ok(()));
    }

    #[test]
    fn detects_out_of_order_keys() {
        let mut tree = build::<Compact>(&[2, 1, 3]);
        let first = tree.first();
        *tree.record_mut(first) = 9;
        assert_eq!(tree.check(), Err(Violation::OutOfOrder(first.to_usize())));
        assert!(!tree.validate());
    }

    #[test]
    fn detects_rank_rule_breaks() {
        // 3 is a rank 1 node over the leaf 4.
        let mut tree = build::<Compact>(&[2, 1, 3, 4]);
        let right = tree.node(tree.root).branch(Dir::Right);
        tree.node_mut(right).demote();
        assert_eq!(tree.check(), Err(Violation::RankRule(right.to_usize())));

        let mut tree = build::<Compact>(&[1]);
        let root = tree.root;
        tree.node_mut(root).promote();
        assert_eq!(tree.check(), Err(Violation::LeafRank(root.to_usize())));
    }

    #[test]
    fn detects_parent_mismatch() {
        let mut tree = build::<FreeList>(&[2, 1, 3]);
        let left = tree.node(tree.root).branch(Dir::Left);
        tree.node_mut(left).set_parent(left);
        assert_eq!(
            tree.check(),
            Err(Violation::ParentMismatch {
                child: left.to_usize(),
                expected: tree.root.to_usize(),
                found: left.to_usize(),
            })
        );
    }

    #[test]
    fn detects_leaked_slots() {
        let mut tree = build::<FreeList>(&[2, 1, 3]);
        // Detach the right leaf without handing its slot back.
        let root = tree.root;
        let right = tree.node(root).branch(Dir::Right);
        tree.node_mut(root).set_branch(Dir::Right, Index::NIL);
        assert_eq!(tree.check(), Err(Violation::SizeMismatch { reached: 2, live: 3 }));
        assert!(tree.try_record(right).is_some());
    }
}
