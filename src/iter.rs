//! Borrowing iterators shared by both maps.

use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Dir, Span, Store};

/// An iterator over the records of a map, in ascending key order.
///
/// This `struct` is created by the `iter` method on
/// [`FlatOrderedMap`](crate::FlatOrderedMap::iter) and
/// [`HandleOrderedMap`](crate::HandleOrderedMap::iter).
///
/// # Examples
///
/// ```
/// use flat_wavl::FlatOrderedMap;
///
/// fn id(v: &u8) -> &u8 {
///     v
/// }
///
/// let mut map = FlatOrderedMap::new(id);
/// map.extend([3, 1, 2]);
/// let mut iter = map.iter();
/// assert_eq!(iter.len(), 3);
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.next(), Some(&2));
/// assert_eq!(iter.next(), None);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    store: &'a Store<T>,
    span: Span,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) const fn new(store: &'a Store<T>, span: Span, remaining: usize) -> Self {
        Self { store, span, remaining }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let index = self.span.next(self.store, Dir::Right)?;
        self.remaining -= 1;
        Some(self.store.record(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        let index = self.span.next_back(self.store, Dir::Right)?;
        self.remaining -= 1;
        Some(self.store.record(index))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// An iterator over a key range of a map, in ascending key order.
///
/// Created by the `range` method of either map. The range is inclusive of both keys.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, T> {
    store: &'a Store<T>,
    span: Span,
}

/// An iterator over a key range of a map, in descending key order.
///
/// Created by the `range_rev` method of either map. The range is inclusive of both keys.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct RangeRev<'a, T> {
    store: &'a Store<T>,
    span: Span,
}

macro_rules! span_iter {
    ($name:ident, $dir:expr) => {
        impl<'a, T> $name<'a, T> {
            pub(crate) const fn new(store: &'a Store<T>, span: Span) -> Self {
                Self { store, span }
            }
        }

        impl<T> Clone for $name<'_, T> {
            fn clone(&self) -> Self {
                Self { ..*self }
            }
        }

        impl<T: fmt::Debug> fmt::Debug for $name<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list().entries(self.clone()).finish()
            }
        }

        impl<'a, T> Iterator for $name<'a, T> {
            type Item = &'a T;

            fn next(&mut self) -> Option<&'a T> {
                let index = self.span.next(self.store, $dir)?;
                Some(self.store.record(index))
            }

            fn last(mut self) -> Option<&'a T> {
                self.next_back()
            }
        }

        impl<'a, T> DoubleEndedIterator for $name<'a, T> {
            fn next_back(&mut self) -> Option<&'a T> {
                let index = self.span.next_back(self.store, $dir)?;
                Some(self.store.record(index))
            }
        }

        impl<T> FusedIterator for $name<'_, T> {}
    };
}

span_iter!(Range, Dir::Right);
span_iter!(RangeRev, Dir::Left);
