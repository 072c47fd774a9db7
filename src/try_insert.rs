/// The outcome of a `try_insert` that obtained a slot or found the key already present.
///
/// `L` locates the stored record: a mutable reference for
/// [`FlatOrderedMap`](crate::FlatOrderedMap) and a [`Handle`](crate::Handle) for
/// [`HandleOrderedMap`](crate::HandleOrderedMap).
///
/// # Examples
///
/// ```
/// use flat_wavl::{FlatOrderedMap, TryInsert};
///
/// fn key(entry: &(u8, char)) -> &u8 {
///     &entry.0
/// }
///
/// let mut map = FlatOrderedMap::new(key);
/// assert!(map.try_insert((1, 'a')).unwrap().is_inserted());
///
/// match map.try_insert((1, 'b')).unwrap() {
///     TryInsert::Present(current, rejected) => {
///         assert_eq!(*current, (1, 'a'));
///         assert_eq!(rejected, (1, 'b'));
///     }
///     TryInsert::Inserted(_) => unreachable!(),
/// }
/// ```
#[derive(Debug, Eq, PartialEq, Hash)]
pub enum TryInsert<L, T> {
    /// The key was absent and the record is now stored at `L`.
    Inserted(L),
    /// The key was present. The record at `L` is unchanged and the offered record is handed back.
    Present(L, T),
}

impl<L, T> TryInsert<L, T> {
    /// Returns `true` when the record was stored.
    #[must_use]
    pub const fn is_inserted(&self) -> bool {
        matches!(self, TryInsert::Inserted(_))
    }

    /// Returns the location of the record stored under the key, whichever record that is.
    pub fn into_location(self) -> L {
        match self {
            TryInsert::Inserted(location) | TryInsert::Present(location, _) => location,
        }
    }

    /// Returns the rejected record, if the key was already present.
    pub fn into_rejected(self) -> Option<T> {
        match self {
            TryInsert::Inserted(_) => None,
            TryInsert::Present(_, rejected) => Some(rejected),
        }
    }
}
