//! Hash index interface consumed by the partition layer

use std::path::Path;

use super::errors::IndexResult;

/// Persistent multi-map from integer key to integer value.
///
/// Duplicate keys are allowed. Implementations must be safe for concurrent
/// use from many threads: every method takes `&self`.
pub trait HashIndex: Send + Sync {
    /// Location of the backing file, for diagnostics.
    fn path(&self) -> &Path;

    /// Add a (key, value) pair. Existing pairs for the key are kept.
    fn put(&self, key: u64, value: u64) -> IndexResult<()>;

    /// Values stored under `key`, oldest first, at most `limit` of them.
    /// A `limit` of zero means no limit.
    fn get(&self, key: u64, limit: usize) -> IndexResult<Vec<u64>>;

    /// Remove one (key, value) pair if present.
    fn remove(&self, key: u64, value: u64) -> IndexResult<()>;

    /// All pairs in shard `part` of `total`, as index-aligned key and value
    /// vectors. Shard membership is a function of the key alone.
    fn get_partition(&self, part: usize, total: usize) -> IndexResult<(Vec<u64>, Vec<u64>)>;

    /// Drop every pair, keeping the index usable.
    fn clear(&self) -> IndexResult<()>;

    /// Flush and release the backing file.
    fn close(&self) -> IndexResult<()>;
}
