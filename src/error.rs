use core::fmt;

use thiserror::Error;

/// Failures reported by the ordered maps.
///
/// Every failure is returned at the point of the call and leaves the map exactly as it was.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The backing store is full and was built with [`Growth::Fixed`](crate::Growth::Fixed).
    #[error("backing store is full and may not grow")]
    NoCapacity,
    /// The growth policy or the global allocator refused to provide more slots.
    #[error("allocator refused to grow the backing store")]
    AllocatorDenied,
    /// The handle does not name a live record.
    #[error("handle does not refer to a live record")]
    InvalidHandle,
    /// Storage cannot be released because the map does not own an allocation policy.
    #[error("backing store is fixed and cannot be released")]
    NoAllocator,
}

/// An insertion that could not obtain a slot.
///
/// The record is handed back untouched and the map is unchanged.
///
/// # Examples
///
/// ```
/// use flat_wavl::{Error, FlatOrderedMap};
///
/// fn id(v: &u32) -> &u32 {
///     v
/// }
///
/// // Two slots: the sentinel and one record.
/// let mut map = FlatOrderedMap::fixed(id, 2);
/// map.insert(1).unwrap();
///
/// let err = map.insert(2).unwrap_err();
/// assert_eq!(err.error, Error::NoCapacity);
/// assert_eq!(err.into_record(), 2);
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InsertError<T> {
    /// Why no slot was available.
    pub error: Error,
    /// The record that was not inserted.
    pub record: T,
}

impl<T> InsertError<T> {
    pub(crate) const fn new(error: Error, record: T) -> Self {
        Self { error, record }
    }

    /// Returns the record that was not inserted.
    pub fn into_record(self) -> T {
        self.record
    }
}

impl<T> fmt::Display for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insert failed: {}", self.error)
    }
}

impl<T: fmt::Debug> core::error::Error for InsertError<T> {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn messages() {
        assert_eq!(Error::NoCapacity.to_string(), "backing store is full and may not grow");
        assert_eq!(Error::AllocatorDenied.to_string(), "allocator refused to grow the backing store");
        let err = InsertError::new(Error::AllocatorDenied, 7u8);
        assert_eq!(err.to_string(), "insert failed: allocator refused to grow the backing store");
        assert_eq!(err.into_record(), 7);
    }
}
