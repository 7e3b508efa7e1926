#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;

/// A HashMap implementation using separate chaining.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

/// The raw separate-chaining table.
///
/// `HashTable` takes precomputed hashes and equality predicates, and owns
/// the bucket array, growth policy and position bookkeeping used by
/// `HashMap`.
pub mod hash_table;

pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
#[cfg(feature = "stats")]
pub use hash_table::BucketStats;
pub use hash_table::GrowthPolicy;
pub use hash_table::HashTable;
pub use hash_table::Position;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is specified.
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}
