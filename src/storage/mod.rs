//! Record store subsystem
//!
//! Stores raw document payloads addressed by physical offset. The partition
//! layer consumes it only through the [`RecordStore`] trait; [`DataFile`] is
//! the file-backed implementation.
//!
//! # Design Principles
//!
//! - Slots reserve room for growth, so most updates happen in place
//! - Updates that outgrow their room relocate to a new offset
//! - Checksum-verified on every read
//! - Deleted slots read as absent, never as errors
//! - Internally synchronized: every operation takes `&self`

mod checksum;
mod data_file;
mod errors;
mod slot;
mod store;

pub use checksum::compute_checksum;
pub use data_file::DataFile;
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use slot::{SlotHeader, SLOT_HEADER_SIZE};
pub use store::RecordStore;
