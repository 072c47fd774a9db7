//! Ordered navigation: extremes, in-order steps, bounds and the two range queries.
//!
//! Ranges come in two shapes. [`RawTree::equal_range`] and [`RawTree::equal_range_reverse`] return
//! a half-open `[first, end)` pair where `end` is [`Index::NIL`] for "past the last element".
//! Iterators want both ends to be real elements, so [`Span`] stores an inclusive pair instead.

use core::cmp::Ordering;

use super::index::Index;
use super::node::Dir;
use super::policy::SlotPolicy;
use super::store::Store;
use super::tree::RawTree;
use crate::compare::Compare;

impl<T> Store<T> {
    /// The last node reached from `from` by following `dir` branches.
    pub(crate) fn extreme(&self, mut from: Index, dir: Dir) -> Index {
        if from.is_nil() {
            return Index::NIL;
        }
        loop {
            let next = self.node(from).branch(dir);
            if next.is_nil() {
                return from;
            }
            from = next;
        }
    }

    /// The in-order neighbour of `index` on side `dir`: successor for [`Dir::Right`], predecessor
    /// for [`Dir::Left`]. [`Index::NIL`] past either end.
    ///
    /// O(log n) worst case, O(1) amortized over a full traversal.
    pub(crate) fn step(&self, index: Index, dir: Dir) -> Index {
        let child = self.node(index).branch(dir);
        if !child.is_nil() {
            return self.extreme(child, dir.flip());
        }
        // Climb while we arrive from the `dir` side.
        let mut child = index;
        let mut parent = self.node(index).parent();
        while !parent.is_nil() && self.node(parent).branch(dir) == child {
            child = parent;
            parent = self.node(parent).parent();
        }
        parent
    }
}

/// An inclusive run of in-order neighbours, consumed from either end.
///
/// `front` is reached from `back` by stepping against the walk direction. Both are
/// [`Index::NIL`] once the run is exhausted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Span {
    front: Index,
    back: Index,
}

impl Span {
    pub(crate) const EMPTY: Self = Self {
        front: Index::NIL,
        back: Index::NIL,
    };

    /// Both ends must be live and `back` reachable from `front`, or both must be `NIL`.
    pub(crate) const fn new(front: Index, back: Index) -> Self {
        Self { front, back }
    }

    pub(crate) const fn is_empty(self) -> bool {
        self.front.is_nil()
    }

    /// Yields `front` and moves it one step in `dir`.
    pub(crate) fn next<T>(&mut self, store: &Store<T>, dir: Dir) -> Option<Index> {
        if self.is_empty() {
            return None;
        }
        let current = self.front;
        if current == self.back {
            *self = Self::EMPTY;
        } else {
            self.front = store.step(current, dir);
        }
        Some(current)
    }

    /// Yields `back` and moves it one step against `dir`.
    pub(crate) fn next_back<T>(&mut self, store: &Store<T>, dir: Dir) -> Option<Index> {
        if self.is_empty() {
            return None;
        }
        let current = self.back;
        if current == self.front {
            *self = Self::EMPTY;
        } else {
            self.back = store.step(current, dir.flip());
        }
        Some(current)
    }
}

impl<T, K: ?Sized, C, P: SlotPolicy> RawTree<T, K, C, P> {
    /// Slot of the smallest key.
    pub(crate) fn first(&self) -> Index {
        self.store.extreme(self.root, Dir::Left)
    }

    /// Slot of the largest key.
    pub(crate) fn last(&self) -> Index {
        self.store.extreme(self.root, Dir::Right)
    }

    pub(crate) fn successor(&self, index: Index) -> Index {
        self.store.step(index, Dir::Right)
    }

    pub(crate) fn predecessor(&self, index: Index) -> Index {
        self.store.step(index, Dir::Left)
    }

    /// Every live record in ascending order.
    pub(crate) fn span(&self) -> Span {
        Span::new(self.first(), self.last())
    }

    /// Converts a half-open `[first, end)` walked in `dir` into an inclusive [`Span`].
    fn close(&self, first: Index, end: Index, dir: Dir) -> Span {
        if first == end {
            return Span::EMPTY;
        }
        let back = if end.is_nil() { self.store.extreme(self.root, dir) } else { self.store.step(end, dir.flip()) };
        Span::new(first, back)
    }
}

impl<T, K: ?Sized, C: Compare<K>, P: SlotPolicy> RawTree<T, K, C, P> {
    /// The first node, walking in `dir`, whose key compared against `key` satisfies `keep`.
    ///
    /// `keep` must be monotone along `dir`: once it holds it holds for every later node.
    fn bound(&self, key: &K, dir: Dir, keep: fn(Ordering) -> bool) -> Index {
        let mut best = Index::NIL;
        let mut cursor = self.root;
        while !cursor.is_nil() {
            if keep(self.compare(self.key_at(cursor), key)) {
                best = cursor;
                cursor = self.node(cursor).branch(dir.flip());
            } else {
                cursor = self.node(cursor).branch(dir);
            }
        }
        best
    }

    /// First node with a key `>= key`.
    pub(crate) fn lower_bound(&self, key: &K) -> Index {
        self.bound(key, Dir::Right, Ordering::is_ge)
    }

    /// First node with a key `> key`.
    pub(crate) fn upper_bound(&self, key: &K) -> Index {
        self.bound(key, Dir::Right, Ordering::is_gt)
    }

    /// Last node with a key `<= key`.
    pub(crate) fn rlower_bound(&self, key: &K) -> Index {
        self.bound(key, Dir::Left, Ordering::is_le)
    }

    /// Last node with a key `< key`.
    pub(crate) fn rupper_bound(&self, key: &K) -> Index {
        self.bound(key, Dir::Left, Ordering::is_lt)
    }

    /// Ascending half-open range `[first >= begin, first > end)`.
    ///
    /// `begin > end` yields an empty range `(NIL, NIL)`.
    pub(crate) fn equal_range(&self, begin: &K, end: &K) -> (Index, Index) {
        if self.compare(begin, end).is_gt() {
            return (Index::NIL, Index::NIL);
        }
        (self.lower_bound(begin), self.upper_bound(end))
    }

    /// Descending half-open range `[last <= rbegin, last < rend)`.
    ///
    /// `rbegin < rend` yields an empty range `(NIL, NIL)`.
    pub(crate) fn equal_range_reverse(&self, rbegin: &K, rend: &K) -> (Index, Index) {
        if self.compare(rbegin, rend).is_lt() {
            return (Index::NIL, Index::NIL);
        }
        (self.rlower_bound(rbegin), self.rupper_bound(rend))
    }

    /// Records with keys in `[begin, end]`, walked with [`Dir::Right`].
    pub(crate) fn range_span(&self, begin: &K, end: &K) -> Span {
        let (first, end) = self.equal_range(begin, end);
        self.close(first, end, Dir::Right)
    }

    /// Records with keys in `[rend, rbegin]`, walked with [`Dir::Left`] from `rbegin`.
    pub(crate) fn range_rev_span(&self, rbegin: &K, rend: &K) -> Span {
        let (first, end) = self.equal_range_reverse(rbegin, rend);
        self.close(first, end, Dir::Left)
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[cfg(test)]
    pub(crate) fn height(&self) -> usize {
        fn walk<T>(store: &Store<T>, index: Index) -> usize {
            if index.is_nil() {
                return 0;
            }
            let [left, right] = store.node(index).branches();
            1 + walk(store, left).max(walk(store, right))
        }
        walk(&self.store, self.root)
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

    fn id(v: &i32) -> &i32 {
        v
    }

    /// Tree holding the even keys `0, 2, .., 18`.
    fn evens() -> RawTree<i32, i32, Natural, FreeList> {
        let mut tree = RawTree::new(id, Natural, Growth::Unbounded);
        for key in (0..20).step_by(2).rev() {
            tree.insert(key).unwrap();
        }
        tree
    }

    fn keys<P: SlotPolicy>(tree: &RawTree<i32, i32, Natural, P>, mut span: Span, dir: Dir) -> Vec<i32> {
        let mut out = Vec::new();
        while let Some(index) = span.next(&tree.store, dir) {
            out.push(*tree.key_at(index));
        }
        out
    }

    #[test]
    fn extremes_and_steps() {
        let tree = evens();
        assert_eq!(*tree.key_at(tree.first()), 0);
        assert_eq!(*tree.key_at(tree.last()), 18);
        assert!(tree.predecessor(tree.first()).is_nil());
        assert!(tree.successor(tree.last()).is_nil());

        let mut cursor = tree.last();
        let mut seen = Vec::new();
        while !cursor.is_nil() {
            seen.push(*tree.key_at(cursor));
            cursor = tree.predecessor(cursor);
        }
        assert_eq!(seen, [18, 16, 14, 12, 10, 8, 6, 4, 2, 0]);
    }

    #[test]
    fn bounds() {
        let tree = evens();
        let key = |index: Index| (!index.is_nil()).then(|| *tree.key_at(index));
        assert_eq!(key(tree.lower_bound(&4)), Some(4));
        assert_eq!(key(tree.lower_bound(&5)), Some(6));
        assert_eq!(key(tree.upper_bound(&4)), Some(6));
        assert_eq!(key(tree.upper_bound(&18)), None);
        assert_eq!(key(tree.rlower_bound(&5)), Some(4));
        assert_eq!(key(tree.rupper_bound(&4)), Some(2));
        assert_eq!(key(tree.rupper_bound(&0)), None);
        assert_eq!(key(tree.lower_bound(&-3)), Some(0));
    }

    #[test]
    fn equal_range_is_half_open() {
        let tree = evens();
        let (first, end) = tree.equal_range(&3, &8);
        assert_eq!(*tree.key_at(first), 4);
        assert_eq!(*tree.key_at(end), 10);

        let (first, end) = tree.equal_range(&10, &100);
        assert_eq!(*tree.key_at(first), 10);
        assert!(end.is_nil());

        let (first, end) = tree.equal_range_reverse(&9, &2);
        assert_eq!(*tree.key_at(first), 8);
        assert_eq!(*tree.key_at(end), 0);
    }

    #[test]
    fn inverted_ranges_are_empty() {
        let tree = evens();
        assert_eq!(tree.equal_range(&8, &3), (Index::NIL, Index::NIL));
        assert_eq!(tree.equal_range_reverse(&3, &8), (Index::NIL, Index::NIL));
        assert!(tree.range_span(&8, &3).is_empty());
        assert!(tree.range_span(&7, &7).is_empty());
    }

    #[test]
    fn spans_walk_both_ways() {
        let tree = evens();
        assert_eq!(keys(&tree, tree.range_span(&3, &12), Dir::Right), [4, 6, 8, 10, 12]);
        assert_eq!(keys(&tree, tree.range_rev_span(&13, &3), Dir::Left), [12, 10, 8, 6, 4]);
        assert_eq!(keys(&tree, tree.range_span(&-10, &100), Dir::Right).len(), 10);

        let mut span = tree.range_span(&0, &6);
        assert_eq!(span.next_back(&tree.store, Dir::Right).map(|i| *tree.key_at(i)), Some(6));
        assert_eq!(span.next(&tree.store, Dir::Right).map(|i| *tree.key_at(i)), Some(0));
        assert_eq!(span.next_back(&tree.store, Dir::Right).map(|i| *tree.key_at(i)), Some(4));
        assert_eq!(span.next(&tree.store, Dir::Right).map(|i| *tree.key_at(i)), Some(2));
        assert_eq!(span.next(&tree.store, Dir::Right), None);
        assert_eq!(span.next_back(&tree.store, Dir::Right), None);
    }

    #[test]
    fn empty_tree_queries() {
        let tree: RawTree<i32, i32, Natural, Compact> = RawTree::new(id, Natural, Growth::Unbounded);
        assert!(tree.first().is_nil());
        assert!(tree.last().is_nil());
        assert!(tree.lower_bound(&1).is_nil());
        assert!(tree.span().is_empty());
        assert_eq!(tree.height(), 0);
    }
}
