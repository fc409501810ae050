//! Partition subsystem
//!
//! A partition owns one record store and one hash index and presents the
//! pair as a document collection addressed by logical ID.
//!
//! # Design Principles
//!
//! - Logical IDs never change; physical offsets may
//! - Index and store are kept in step by every mutation
//! - Exclusive-update locks are advisory and per document
//! - Clear and close attempt both collaborators before reporting

mod errors;
mod lock;
#[allow(clippy::module_inception)]
mod partition;
mod scan;

pub use errors::{PartitionError, PartitionResult};
pub use lock::{UpdateGuard, UpdateLockTable};
pub use partition::Partition;
pub use scan::{MIN_SAMPLE_PARTITIONS, SAMPLE_PARTITIONS};

/// Logical document identifier, stable for the life of a document
pub type DocId = u64;
