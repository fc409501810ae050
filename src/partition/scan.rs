//! Shard scans and cardinality estimation
//!
//! The hash index splits its key space into disjoint shards. A full scan
//! runs one shard per thread; a cardinality estimate samples a single shard.
//! Scans give no snapshot: documents inserted or removed while a scan runs
//! may or may not be visited.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use super::errors::PartitionResult;
use super::partition::Partition;
use super::DocId;
use crate::index::{HashIndex, IndexError};
use crate::observability::{log_event, Event};
use crate::storage::RecordStore;

/// Shard count of the first cardinality sample
pub const SAMPLE_PARTITIONS: usize = 24;

/// Below this shard count an empty sample means an empty partition
pub const MIN_SAMPLE_PARTITIONS: usize = 8;

impl<S: RecordStore, I: HashIndex> Partition<S, I> {
    /// Visit every document in shard `part` of `total`.
    ///
    /// Index entries whose payload is gone are skipped, as are entries whose
    /// payload cannot be read (logged). `visit` returns `false` to stop.
    /// Returns `true` if the whole shard was visited.
    pub fn for_each_document<F>(&self, part: usize, total: usize, mut visit: F) -> PartitionResult<bool>
    where
        F: FnMut(DocId, &[u8]) -> bool,
    {
        let (ids, offsets) = self.index().get_partition(part, total)?;
        for (id, offset) in ids.into_iter().zip(offsets) {
            let doc = match self.store().read(offset) {
                Ok(Some(doc)) => doc,
                Ok(None) => continue,
                Err(e) => {
                    log_event(
                        Event::ScanReadFailed,
                        &[
                            ("error", e.to_string().as_str()),
                            ("id", id.to_string().as_str()),
                            ("offset", offset.to_string().as_str()),
                        ],
                    );
                    continue;
                }
            };
            if !visit(id, &doc) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Visit every document, one scoped thread per shard.
    ///
    /// `visit` is shared by all threads. Once any call returns `false`, every
    /// shard stops at its next document. Returns `true` if all shards were
    /// visited completely. The first shard error, if any, is returned.
    pub fn scan_parallel<F>(&self, total: usize, visit: F) -> PartitionResult<bool>
    where
        F: Fn(DocId, &[u8]) -> bool + Sync,
    {
        if total == 0 {
            return Err(IndexError::invalid_partition(0, 0).into());
        }

        let stop = AtomicBool::new(false);
        let results: Vec<PartitionResult<bool>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..total)
                .map(|part| {
                    let stop = &stop;
                    let visit = &visit;
                    scope.spawn(move || {
                        self.for_each_document(part, total, |id, doc| {
                            if stop.load(Ordering::Relaxed) {
                                return false;
                            }
                            if visit(id, doc) {
                                return true;
                            }
                            stop.store(true, Ordering::Relaxed);
                            false
                        })
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let mut complete = true;
        for result in results {
            complete &= result?;
        }
        Ok(complete)
    }

    /// Approximate number of documents.
    ///
    /// Counts one shard of 24 and scales up. An empty sample is retried with
    /// half as many (larger) shards; once fewer than 8 shards still give an
    /// empty sample, the partition is taken to be empty. Deleted payloads
    /// whose index entries remain are counted.
    pub fn approximate_count(&self) -> PartitionResult<u64> {
        let mut total = SAMPLE_PARTITIONS;
        loop {
            let (keys, _) = self.index().get_partition(0, total)?;
            if !keys.is_empty() {
                return Ok(keys.len() as u64 * total as u64);
            }
            if total < MIN_SAMPLE_PARTITIONS {
                return Ok(0);
            }
            total /= 2;
        }
    }
}
