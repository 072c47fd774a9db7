use core::num::NonZero;

type RawIndex = u32;

/// A slot index into the node table.
///
/// Slot 0 is the permanent sentinel, so [`Index::NIL`] doubles as "no child", "no parent" and
/// "end of the free list".
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
pub(crate) struct Index(RawIndex);

impl Index {
    pub(crate) const NIL: Self = Self(0);
    /// The largest slot index that can be represented. Slot counts are bounded by `MAX + 1`.
    pub(crate) const MAX: usize = RawIndex::MAX as usize;

    #[inline]
    pub(crate) const fn from_usize(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Index::from_usize()` - `index` > `Index::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        Self(index as RawIndex)
    }

    #[inline]
    pub(crate) const fn to_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) const fn is_nil(self) -> bool {
        self.0 == 0
    }

    /// Returns the index as a non-zero value, or `None` for the sentinel.
    #[inline]
    pub(crate) const fn to_non_zero(self) -> Option<NonZero<u32>> {
        NonZero::new(self.0)
    }

    #[inline]
    pub(crate) const fn from_non_zero(raw: NonZero<u32>) -> Self {
        Self(raw.get())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Index, RawIndex);
    assert_eq_size!(Option<NonZero<u32>>, Index);

    #[test]
    fn nil_is_slot_zero() {
        assert!(Index::NIL.is_nil());
        assert_eq!(Index::NIL.to_usize(), 0);
        assert_eq!(Index::NIL.to_non_zero(), None);
        assert_eq!(Index::default(), Index::NIL);
    }

    #[test]
    #[should_panic(expected = "`Index::from_usize()` - `index` > `Index::MAX`!")]
    fn invalid_index() {
        let _ = Index::from_usize(Index::MAX + 1);
    }

    proptest! {
        #[test]
        fn index_round_trip(index in 1..=Index::MAX) {
            let slot = Index::from_usize(index);
            prop_assert_eq!(slot.to_usize(), index);
            prop_assert!(!slot.is_nil());
            let raw = slot.to_non_zero().unwrap();
            prop_assert_eq!(Index::from_non_zero(raw), slot);
        }
    }
}
