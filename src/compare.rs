use core::cmp::Ordering;

/// A three-way key order.
///
/// The maps never assume [`Ord`] on the key. Any type implementing `Compare<K>` can order them,
/// and so can any closure or function `Fn(&K, &K) -> Ordering`.
///
/// The order must be total and consistent for as long as a key is in the map, and `compare` must
/// not touch the map that calls it.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use flat_wavl::FlatOrderedMap;
///
/// fn name<'a>(pair: &'a (&'static str, u32)) -> &'a &'static str {
///     &pair.0
/// }
///
/// fn by_length(a: &&str, b: &&str) -> Ordering {
///     a.len().cmp(&b.len()).then_with(|| a.cmp(b))
/// }
///
/// let mut map = FlatOrderedMap::with_comparator(name, by_length);
/// map.insert(("ccc", 3)).unwrap();
/// map.insert(("a", 1)).unwrap();
/// map.insert(("bb", 2)).unwrap();
///
/// let names: Vec<_> = map.iter().map(|pair| pair.0).collect();
/// assert_eq!(names, ["a", "bb", "ccc"]);
/// ```
pub trait Compare<K: ?Sized> {
    /// Orders `a` relative to `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The order given by the key's [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<K: ?Sized + Ord> Compare<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn reversed(a: &i32, b: &i32) -> Ordering {
        b.cmp(a)
    }

    #[test]
    fn natural_uses_ord() {
        assert_eq!(Natural.compare(&1i32, &2), Ordering::Less);
        assert_eq!(Natural.compare("b", "a"), Ordering::Greater);
    }

    #[test]
    fn functions_and_closures_compare() {
        assert_eq!(Compare::<i32>::compare(&reversed, &1, &2), Ordering::Greater);
        let by_abs = |a: &i32, b: &i32| a.abs().cmp(&b.abs());
        assert_eq!(Compare::<i32>::compare(&by_abs, &-3, &2), Ordering::Greater);
    }
}
