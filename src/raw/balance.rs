//! Rank maintenance for weak AVL trees.
//!
//! The rules follow Haeupler, Sen and Tarjan, "Rank-Balanced Trees". Terminology:
//! - `r(x)` is the rank of `x`; the sentinel has rank -1.
//! - `x` is an `i`-child when `r(parent(x)) - r(x) == i`.
//! - a node is `i,j` when its children are an `i`-child and a `j`-child.
//!
//! Valid trees have every rank difference in {1, 2} and every leaf at rank 0. Only rank parity is
//! stored, so a predicate like "is a 2-child" is a parity comparison whose meaning depends on
//! which violation the caller is repairing. The named predicates below keep each case readable.
//! Promoting or demoting twice leaves parity unchanged, so those steps of the paper vanish.

use super::index::Index;
use super::node::{Dir, Node};
use super::policy::SlotPolicy;
use super::tree::RawTree;

/// Rotations performed since the counter was last reset.
#[cfg(test)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(super) struct Rotations {
    pub(super) single: usize,
    pub(super) double: usize,
}

#[cfg(test)]
impl Rotations {
    pub(super) const NONE: Self = Self { single: 0, double: 0 };

    /// Cost in single rotations; a double rotation counts as two.
    pub(super) const fn cost(self) -> usize {
        self.single + 2 * self.double
    }
}

impl<T, K: ?Sized, C, P: SlotPolicy> RawTree<T, K, C, P> {
    #[inline]
    fn parity(&self, index: Index) -> bool {
        self.node(index).parity()
    }

    #[inline]
    fn parent_of(&self, index: Index) -> Index {
        self.node(index).parent()
    }

    #[inline]
    fn branch_of(&self, index: Index, dir: Dir) -> Index {
        self.node(index).branch(dir)
    }

    /// Side of `parent` on which `child` hangs. A `NIL` child resolves to whichever side is
    /// empty, left first.
    #[inline]
    fn side_of(&self, parent: Index, child: Index) -> Dir {
        Dir::from_bool(self.branch_of(parent, Dir::Left) != child)
    }

    #[inline]
    fn sibling_of(&self, parent: Index, child: Index) -> Index {
        self.branch_of(parent, self.side_of(parent, child).flip())
    }

    #[inline]
    fn set_parent_of(&mut self, index: Index, parent: Index) {
        if !index.is_nil() {
            self.node_mut(index).set_parent(parent);
        }
    }

    #[inline]
    fn promote(&mut self, index: Index) {
        self.node_mut(index).promote();
    }

    #[inline]
    fn demote(&mut self, index: Index) {
        self.node_mut(index).demote();
    }

    // Rank predicates.

    #[inline]
    fn is_0_child(&self, parent: Index, child: Index) -> bool {
        self.parity(parent) == self.parity(child)
    }

    #[inline]
    fn is_1_child(&self, parent: Index, child: Index) -> bool {
        self.parity(parent) != self.parity(child)
    }

    #[inline]
    fn is_2_child(&self, parent: Index, child: Index) -> bool {
        self.parity(parent) == self.parity(child)
    }

    #[inline]
    fn is_3_child(&self, parent: Index, child: Index) -> bool {
        self.parity(parent) != self.parity(child)
    }

    /// `x` is a 0-child of `p` and `y` a 1-child.
    #[inline]
    fn is_01_parent(&self, x: Index, p: Index, y: Index) -> bool {
        self.is_0_child(p, x) && self.is_1_child(p, y)
    }

    /// `x` is a 0-child of `p` and `y` a 2-child.
    #[inline]
    fn is_02_parent(&self, x: Index, p: Index, y: Index) -> bool {
        self.is_0_child(p, x) && self.is_2_child(p, y)
    }

    /// Both `x` and `y` are 2-children of `p`.
    #[inline]
    fn is_22_parent(&self, x: Index, p: Index, y: Index) -> bool {
        self.is_2_child(p, x) && self.is_2_child(p, y)
    }

    /// Points the `parent` edge that led to `old` at `new`. `NIL` parent means `old` was the root.
    fn replace_child(&mut self, parent: Index, old: Index, new: Index) {
        if parent.is_nil() {
            self.root = new;
        } else {
            let dir = Dir::from_bool(self.branch_of(parent, Dir::Right) == old);
            self.node_mut(parent).set_branch(dir, new);
        }
    }

    /// Single rotation lifting `x` above its parent `z`.
    ///
    /// ```text
    ///        z              x
    ///     x     C   ->   A     z
    ///   A   y                y   C
    /// ```
    ///
    /// `dir` is the side of `x` that `z` lands on and `y` is `x.branch(dir)`, which moves to
    /// `z.branch(!dir)`. Ranks are the caller's business.
    fn rotate(&mut self, z: Index, x: Index, y: Index, dir: Dir) {
        debug_assert!(!z.is_nil() && !x.is_nil());
        #[cfg(test)]
        {
            self.rotations.single += 1;
        }
        let g = self.parent_of(z);
        self.node_mut(x).set_parent(g);
        self.replace_child(g, z, x);

        self.node_mut(x).set_branch(dir, z);
        self.node_mut(z).set_parent(x);

        self.node_mut(z).set_branch(dir.flip(), y);
        self.set_parent_of(y, z);
    }

    /// Double rotation lifting `y`, the inner child of `x`, above both `x` and `z`.
    ///
    /// ```text
    ///        z               y
    ///     x     D   ->    x     z
    ///   A   y           A   B C   D
    ///      B C
    /// ```
    ///
    /// `dir` is the side of `z` that `x` hangs on, and `y` is `x.branch(!dir)`. Done as one
    /// relink so parent and child links never disagree halfway through.
    fn double_rotate(&mut self, z: Index, x: Index, y: Index, dir: Dir) {
        debug_assert!(!z.is_nil() && !x.is_nil() && !y.is_nil());
        #[cfg(test)]
        {
            self.rotations.double += 1;
        }
        let g = self.parent_of(z);
        self.node_mut(y).set_parent(g);
        self.replace_child(g, z, y);

        let near = self.branch_of(y, dir);
        let far = self.branch_of(y, dir.flip());

        self.node_mut(x).set_branch(dir.flip(), near);
        self.set_parent_of(near, x);
        self.node_mut(y).set_branch(dir, x);
        self.node_mut(x).set_parent(y);

        self.node_mut(z).set_branch(dir, far);
        self.set_parent_of(far, z);
        self.node_mut(y).set_branch(dir.flip(), z);
        self.node_mut(z).set_parent(y);
    }

    /// Threads the rank 0 leaf `x` into `parent.branch(dir)` and restores the rank rule.
    pub(super) fn link_leaf(&mut self, parent: Index, dir: Dir, x: Index) {
        *self.node_mut(x) = Node::leaf();
        if parent.is_nil() {
            debug_assert!(self.root.is_nil(), "`link_leaf()` - only an empty tree has no parent!");
            self.root = x;
            return;
        }
        debug_assert!(self.branch_of(parent, dir).is_nil(), "`link_leaf()` - vacancy is occupied!");

        // A leaf parent has rank 0 like the new node, so `x` is a 0-child.
        let rank_rule_broken = self.node(parent).is_leaf();
        self.node_mut(parent).set_branch(dir, x);
        self.node_mut(x).set_parent(parent);
        if rank_rule_broken {
            self.rebalance_inserted(parent, x);
        }
    }

    /// Repairs a 0-child `x` under `z`, at most one (single or double) rotation.
    fn rebalance_inserted(&mut self, mut z: Index, mut x: Index) {
        debug_assert!(self.is_0_child(z, x));
        // While `z` is 0,1, promote it and move the problem up.
        loop {
            self.promote(z);
            x = z;
            z = self.parent_of(z);
            if z.is_nil() {
                return;
            }
            if !self.is_01_parent(x, z, self.sibling_of(z, x)) {
                break;
            }
        }

        // `x` is now a 1-child (done) or `z` is 0,2 and needs a rotation.
        if !self.is_02_parent(x, z, self.sibling_of(z, x)) {
            return;
        }
        let dir = self.side_of(z, x);
        let y = self.branch_of(x, dir.flip());
        if y.is_nil() || self.is_2_child(x, y) {
            self.rotate(z, x, y, dir.flip());
            self.demote(z);
        } else {
            debug_assert!(self.is_1_child(x, y));
            self.double_rotate(z, x, y, dir);
            self.promote(y);
            self.demote(x);
            self.demote(z);
        }
    }

    fn leftmost(&self, mut index: Index) -> Index {
        loop {
            let left = self.branch_of(index, Dir::Left);
            if left.is_nil() {
                return index;
            }
            index = left;
        }
    }

    /// Puts `replacement` where `removed` is, taking over its children and rank.
    fn transplant(&mut self, removed: Index, replacement: Index) {
        let old = *self.node(removed);
        let parent = old.parent();
        self.node_mut(replacement).set_parent(parent);
        self.replace_child(parent, removed, replacement);
        for child in old.branches() {
            self.set_parent_of(child, replacement);
        }
        let node = self.node_mut(replacement);
        node.set_branches(old.branches());
        node.set_parity(old.parity());
    }

    /// Detaches `removed` from the tree and restores the rank rule. The slot itself is left for the
    /// slot policy.
    pub(super) fn unlink(&mut self, removed: Index) {
        let node = *self.node(removed);
        let (left, right) = (node.branch(Dir::Left), node.branch(Dir::Right));

        // `y` is the node physically spliced out, `x` the child that takes its place and `p` the
        // parent of both afterwards.
        let (p, x, two_child) = if left.is_nil() || right.is_nil() {
            let y = removed;
            let p = node.parent();
            let x = if left.is_nil() { right } else { left };
            self.set_parent_of(x, p);
            let two_child = !p.is_nil() && self.is_2_child(p, y);
            self.replace_child(p, y, x);
            (p, x, two_child)
        } else {
            let y = self.leftmost(right);
            let p = self.parent_of(y);
            let x = self.branch_of(y, Dir::Right);
            self.set_parent_of(x, p);
            let two_child = self.is_2_child(p, y);
            self.replace_child(p, y, x);
            self.transplant(removed, y);
            (if p == removed { y } else { p }, x, two_child)
        };

        if p.is_nil() {
            return;
        }
        if two_child {
            // `y` was a 2-child, so `x` is now a 3-child.
            self.rebalance_3_child(p, x);
        } else if x.is_nil() && self.node(p).is_leaf() {
            // `p` lost its only child and is a 2,2 leaf.
            let g = self.parent_of(p);
            let makes_3_child = !g.is_nil() && self.is_2_child(g, p);
            self.demote(p);
            if makes_3_child {
                self.rebalance_3_child(g, p);
            }
        }
        debug_assert!(!self.node(p).is_leaf() || !self.node(p).parity(), "`unlink()` - leaf left at odd rank!");
    }

    /// Repairs a 3-child `x` under `p`: demotions walk up, at most two rotations end the walk.
    fn rebalance_3_child(&mut self, mut p: Index, mut x: Index) {
        loop {
            debug_assert!(!p.is_nil());
            let g = self.parent_of(p);
            let y = self.sibling_of(p, x);
            let made_3_child = !g.is_nil() && self.is_2_child(g, p);

            if self.is_2_child(p, y) {
                self.demote(p);
            } else if self.is_22_parent(self.branch_of(y, Dir::Left), y, self.branch_of(y, Dir::Right)) {
                self.demote(p);
                self.demote(y);
            } else {
                debug_assert!(self.is_1_child(p, y) && self.is_3_child(p, x));
                let dir = self.side_of(p, y).flip();
                self.fix_3_child(p, x, y, dir);
                return;
            }

            if !made_3_child {
                return;
            }
            x = p;
            p = g;
        }
    }

    /// Ends a 3-child repair with one rotation or one double rotation.
    ///
    /// `y` is the 1-child sibling of the 3-child `x`; `dir` is the side of `p` that `x` hangs on.
    fn fix_3_child(&mut self, p: Index, x: Index, y: Index, dir: Dir) {
        debug_assert_eq!(self.branch_of(p, dir), x);
        let near = self.branch_of(y, dir);
        let far = self.branch_of(y, dir.flip());
        if self.is_1_child(y, far) {
            self.rotate(p, y, near, dir);
            self.promote(y);
            self.demote(p);
            if self.node(p).is_leaf() {
                self.demote(p);
            }
        } else {
            debug_assert!(self.is_2_child(y, far) && self.is_1_child(y, near) && !near.is_nil());
            // `near` rises two ranks and `p` falls two, neither changes parity.
            self.double_rotate(p, y, near, dir.flip());
            self.demote(y);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::compare::Natural;
    use crate::raw::policy::{Compact, FreeList};
    use crate::raw::store::Growth;

    fn id(v: &u32) -> &u32 {
        v
    }

    /// Deterministic LCG keys in `0..range`.
    fn keys(n: usize, range: u32) -> Vec<u32> {
        let mut x: u64 = 0x2545_f491;
        (0..n)
            .map(|_| {
                x = x.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                ((x >> 33) as u32) % range
            })
            .collect()
    }

    /// Replays mixed insertions and removals, checking the rotation bound of every operation.
    fn rotation_bounds_hold<P: SlotPolicy>() {
        let mut tree = RawTree::<u32, u32, Natural, P>::new(id, Natural, Growth::Unbounded);
        let mut total = Rotations::NONE;

        for (step, key) in keys(20_000, 512).into_iter().enumerate() {
            tree.rotations = Rotations::NONE;
            if step % 3 == 2 {
                tree.remove(&key);
                assert!(tree.rotations.cost() <= 2, "remove({key}) took {:?}", tree.rotations);
            } else {
                tree.insert(key).unwrap();
                assert!(
                    tree.rotations.single + tree.rotations.double <= 1,
                    "insert({key}) took {:?}",
                    tree.rotations
                );
            }
            total.single += tree.rotations.single;
            total.double += tree.rotations.double;
        }
        assert!(tree.validate());
        // Both repair shapes were exercised.
        assert!(total.single > 0 && total.double > 0, "{total:?}");

        // Draining the tree in key order keeps the removal bound.
        while !tree.is_empty() {
            let key = *tree.key_at(tree.first());
            tree.rotations = Rotations::NONE;
            tree.remove(&key);
            assert!(tree.rotations.cost() <= 2, "remove({key}) took {:?}", tree.rotations);
        }
    }

    #[test]
    fn compact_rotation_bounds() {
        rotation_bounds_hold::<Compact>();
    }

    #[test]
    fn free_list_rotation_bounds() {
        rotation_bounds_hold::<FreeList>();
    }

    #[test]
    fn ascending_inserts_rotate_once_at_most() {
        let mut tree = RawTree::<u32, u32, Natural, Compact>::new(id, Natural, Growth::Unbounded);
        for key in 0..1_000 {
            tree.rotations = Rotations::NONE;
            tree.insert(key).unwrap();
            assert!(tree.rotations.double == 0 && tree.rotations.single <= 1, "insert({key})");
        }
        assert!(tree.validate());
    }
}
