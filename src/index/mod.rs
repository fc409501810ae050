//! Hash index subsystem
//!
//! Maps a document's logical ID to its physical offset in the record store.
//! The partition layer consumes it only through the [`HashIndex`] trait;
//! [`HashTable`] is the file-backed implementation.
//!
//! # Design Principles
//!
//! - Multi-map: duplicate keys are stored, removal targets one exact pair
//! - Fixed head buckets, chained overflow buckets
//! - Shard membership is a pure function of the key
//! - Internally synchronized: every operation takes `&self`

mod errors;
mod hashing;
mod hashtable;
mod lookup;

pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use hashing::{hash_key, partition_range};
pub use hashtable::HashTable;
pub use lookup::HashIndex;
