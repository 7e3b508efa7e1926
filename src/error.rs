use thiserror::Error;

/// Errors returned by the fallible operations of [`HashTable`] and
/// [`HashMap`].
///
/// Lookup misses are not errors: they are reported as `None` or as the end
/// [`Position`].
///
/// [`HashTable`]: crate::HashTable
/// [`HashMap`]: crate::HashMap
/// [`Position`]: crate::Position
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// A rehash to zero buckets was requested. Tables always keep at least
    /// one bucket.
    #[error("bucket count must be at least 1")]
    ZeroBuckets,
    /// The maximum load factor must be strictly positive.
    #[error("max load factor must be positive, got {0}")]
    InvalidLoadFactor(f32),
    /// The position is the end sentinel and does not refer to an entry.
    #[error("position is at the end of the table")]
    EndPosition,
    /// The position was obtained before the table was structurally modified,
    /// or does not address a live entry.
    #[error("position is stale")]
    StalePosition,
}
