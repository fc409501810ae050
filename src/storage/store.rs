//! Record store interface consumed by the partition layer

use std::path::Path;

use super::errors::StorageResult;

/// Byte-blob storage addressed by physical offset.
///
/// Implementations must be safe for concurrent use from many threads:
/// every method takes `&self`.
pub trait RecordStore: Send + Sync {
    /// Location of the backing file, for diagnostics.
    fn path(&self) -> &Path;

    /// Store a new payload and return its physical offset.
    fn insert(&self, data: &[u8]) -> StorageResult<u64>;

    /// Payload at `offset`, or `None` if nothing live is stored there.
    fn read(&self, offset: u64) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the payload at `offset`.
    ///
    /// Returns the offset now holding the payload. It differs from `offset`
    /// when the record had to be relocated.
    fn update(&self, offset: u64, data: &[u8]) -> StorageResult<u64>;

    /// Remove the payload at `offset`. Removing an absent record is a no-op.
    fn delete(&self, offset: u64) -> StorageResult<()>;

    /// Drop every record, keeping the store usable.
    fn clear(&self) -> StorageResult<()>;

    /// Flush and release the backing file.
    fn close(&self) -> StorageResult<()>;
}
