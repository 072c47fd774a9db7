use super::index::Index;

/// A child direction. Left/right cases are written once against `Dir` and its opposite.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    #[inline]
    pub(crate) const fn flip(self) -> Self {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    #[inline]
    pub(crate) const fn idx(self) -> usize {
        self as usize
    }

    /// `Right` when `right` is true. Reads naturally at call sites like
    /// `Dir::from_bool(node.branch(Dir::Right) == child)`.
    #[inline]
    pub(crate) const fn from_bool(right: bool) -> Self {
        if right { Dir::Right } else { Dir::Left }
    }
}

/// The second linkage word of a slot.
///
/// A live slot records its parent, a recycled slot records the next free slot. The two are never
/// confused because the variant is the allocation state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Link {
    Parent(Index),
    Free(Index),
}

/// Per-slot tree linkage.
///
/// Ranks are never stored. `parity` holds the low bit of the rank, which is all the balancing rules
/// need because a rank difference of 1 flips parity and a difference of 2 preserves it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Node {
    branch: [Index; 2],
    link: Link,
    parity: bool,
}

impl Node {
    /// The slot 0 node. Odd parity makes it behave as a rank -1 leaf.
    pub(crate) const SENTINEL: Self = Self {
        branch: [Index::NIL; 2],
        link: Link::Parent(Index::NIL),
        parity: true,
    };

    /// A fresh rank 0 leaf with no parent yet.
    pub(crate) const fn leaf() -> Self {
        Self {
            branch: [Index::NIL; 2],
            link: Link::Parent(Index::NIL),
            parity: false,
        }
    }

    /// A recycled slot pointing at `next` on the free list.
    pub(crate) const fn free(next: Index) -> Self {
        Self {
            branch: [Index::NIL; 2],
            link: Link::Free(next),
            parity: false,
        }
    }

    #[inline]
    pub(crate) const fn branch(&self, dir: Dir) -> Index {
        self.branch[dir.idx()]
    }

    #[inline]
    pub(crate) fn set_branch(&mut self, dir: Dir, child: Index) {
        self.branch[dir.idx()] = child;
    }

    #[inline]
    pub(crate) const fn branches(&self) -> [Index; 2] {
        self.branch
    }

    #[inline]
    pub(crate) fn set_branches(&mut self, branches: [Index; 2]) {
        self.branch = branches;
    }

    #[inline]
    pub(crate) const fn is_leaf(&self) -> bool {
        self.branch[0].is_nil() && self.branch[1].is_nil()
    }

    #[inline]
    pub(crate) const fn link(&self) -> Link {
        self.link
    }

    /// The parent of a live node.
    ///
    /// # Panics
    ///
    /// Debug builds panic when called on a recycled slot.
    #[inline]
    pub(crate) fn parent(&self) -> Index {
        match self.link {
            Link::Parent(parent) => parent,
            Link::Free(_) => {
                debug_assert!(false, "`Node::parent()` - slot is on the free list!");
                Index::NIL
            }
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Index) {
        self.link = Link::Parent(parent);
    }

    #[inline]
    pub(crate) const fn parity(&self) -> bool {
        self.parity
    }

    #[inline]
    pub(crate) fn set_parity(&mut self, parity: bool) {
        self.parity = parity;
    }

    /// Raises the rank by one.
    #[inline]
    pub(crate) fn promote(&mut self) {
        self.parity = !self.parity;
    }

    /// Lowers the rank by one.
    #[inline]
    pub(crate) fn demote(&mut self) {
        self.parity = !self.parity;
    }
}

/// One position of the backing store: the node linkage next to the user's record.
///
/// `record` is `None` exactly for the sentinel and for slots on the free list.
#[derive(Clone, Debug)]
pub(crate) struct Slot<T> {
    pub(crate) node: Node,
    pub(crate) record: Option<T>,
}

impl<T> Slot<T> {
    pub(crate) const fn sentinel() -> Self {
        Self {
            node: Node::SENTINEL,
            record: None,
        }
    }

    pub(crate) const fn live(record: T) -> Self {
        Self {
            node: Node::leaf(),
            record: Some(record),
        }
    }

    pub(crate) const fn free(next: Index) -> Self {
        Self {
            node: Node::free(next),
            record: None,
        }
    }
}
