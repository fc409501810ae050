//! Partition: a record store paired with a hash index
//!
//! The hash index maps each document's unchanging logical ID to the physical
//! offset where its payload currently lives. Every mutation keeps the two in
//! step: an update that relocates the payload rewrites the index pair.
//!
//! Logical IDs must be unique. Inserting twice under one ID stores two
//! payloads reachable from the same ID, and read/update/delete then act on
//! whichever the index returns first.

use std::path::Path;
use std::sync::RwLock;

use super::errors::{PartitionError, PartitionResult};
use super::lock::{UpdateGuard, UpdateLockTable};
use super::DocId;
use crate::config::PartitionConfig;
use crate::index::{HashIndex, HashTable, IndexError};
use crate::observability::{log_event, Event, Logger};
use crate::storage::{DataFile, RecordStore, StorageError};

/// Documents addressed by logical ID.
///
/// Shared between threads by reference (typically in an `Arc`). CRUD calls
/// rely on the collaborators' own synchronization; the exclusive-update
/// lock is available for callers that need read-modify-write atomicity.
pub struct Partition<S = DataFile, I = HashTable> {
    store: S,
    index: I,
    /// Coordination point for callers; never taken internally
    data_lock: RwLock<()>,
    update_locks: UpdateLockTable,
}

impl Partition {
    /// Open (or create) the data file and hash table of a partition.
    pub fn open(
        config: &PartitionConfig,
        data_path: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
    ) -> PartitionResult<Self> {
        config.validate()?;
        let store = DataFile::open(data_path, config)?;
        let index = match HashTable::open(index_path, config) {
            Ok(index) => index,
            Err(e) => {
                let _ = store.close();
                return Err(e.into());
            }
        };

        log_event(
            Event::PartitionOpen,
            &[
                ("data", store.path().display().to_string().as_str()),
                ("index", index.path().display().to_string().as_str()),
            ],
        );
        Ok(Self::from_parts(store, index))
    }
}

impl<S: RecordStore, I: HashIndex> Partition<S, I> {
    /// Assemble a partition from already opened collaborators.
    pub fn from_parts(store: S, index: I) -> Self {
        Self {
            store,
            index,
            data_lock: RwLock::new(()),
            update_locks: UpdateLockTable::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Lock for callers that coordinate bulk work against this partition.
    pub fn data_lock(&self) -> &RwLock<()> {
        &self.data_lock
    }

    /// First physical offset the index holds for `id`.
    fn resolve(&self, id: DocId) -> PartitionResult<u64> {
        self.index
            .get(id, 1)?
            .first()
            .copied()
            .ok_or(PartitionError::NoSuchDocument(id))
    }

    /// Store a document under `id` and return its physical offset.
    ///
    /// The caller guarantees `id` is not already in use.
    pub fn insert(&self, id: DocId, data: &[u8]) -> PartitionResult<u64> {
        let offset = self.store.insert(data)?;
        if let Err(e) = self.index.put(id, offset) {
            self.roll_back_insert(id, offset, &e);
            return Err(e.into());
        }
        Ok(offset)
    }

    /// Drop the payload of an insert whose index entry could not be written.
    fn roll_back_insert(&self, id: DocId, offset: u64, cause: &IndexError) {
        let id = id.to_string();
        let position = offset.to_string();
        let cause = cause.to_string();
        log_event(
            Event::InsertRolledBack,
            &[
                ("cause", cause.as_str()),
                ("id", id.as_str()),
                ("offset", position.as_str()),
            ],
        );
        if let Err(e) = self.store.delete(offset) {
            // The payload stays orphaned; no index entry points at it.
            let error = e.to_string();
            Logger::crit_no_repeat(
                Event::InsertRolledBack.as_str(),
                &[("error", error.as_str()), ("offset", position.as_str())],
            );
        }
    }

    /// Payload of document `id`.
    pub fn read(&self, id: DocId) -> PartitionResult<Vec<u8>> {
        let offset = self.resolve(id)?;
        self.store
            .read(offset)?
            .ok_or(PartitionError::NoSuchDocument(id))
    }

    /// Replace the payload of document `id`.
    ///
    /// If the store relocates the payload, the stale index pair is removed
    /// and the new one inserted. A store failure leaves the index untouched.
    /// If inserting the new pair fails, the document is no longer reachable
    /// by `id`; the new offset is logged as `RELOCATION_LOST`.
    pub fn update(&self, id: DocId, data: &[u8]) -> PartitionResult<()> {
        let offset = self.resolve(id)?;
        let new_offset = self.store.update(offset, data)?;
        if new_offset != offset {
            self.index.remove(id, offset)?;
            if let Err(e) = self.index.put(id, new_offset) {
                self.report_lost_relocation(id, new_offset, &e);
                return Err(e.into());
            }
            log_event(
                Event::DocumentRelocated,
                &[
                    ("from", offset.to_string().as_str()),
                    ("id", id.to_string().as_str()),
                    ("to", new_offset.to_string().as_str()),
                ],
            );
        }
        Ok(())
    }

    /// The old pair is gone and the new one could not be written: the
    /// payload at `offset` is live but unreachable by `id`.
    fn report_lost_relocation(&self, id: DocId, offset: u64, cause: &IndexError) {
        let id = id.to_string();
        let position = offset.to_string();
        let cause = cause.to_string();
        Logger::crit_no_repeat(
            Event::RelocationLost.as_str(),
            &[
                ("cause", cause.as_str()),
                ("id", id.as_str()),
                ("offset", position.as_str()),
            ],
        );
    }

    /// Remove document `id`.
    pub fn delete(&self, id: DocId) -> PartitionResult<()> {
        let offset = self.resolve(id)?;
        self.store.delete(offset)?;
        self.index.remove(id, offset)?;
        Ok(())
    }

    /// Block until the caller holds the exclusive-update lock of `id`.
    ///
    /// Must be paired with [`Partition::unlock_update`]. CRUD calls do not
    /// take this lock; it only excludes other `lock_update` callers.
    pub fn lock_update(&self, id: DocId) {
        self.update_locks.lock(id);
    }

    /// Release the exclusive-update lock of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not locked.
    pub fn unlock_update(&self, id: DocId) {
        self.update_locks.unlock(id);
    }

    /// Hold the exclusive-update lock of `id` until the guard is dropped.
    pub fn exclusive_update(&self, id: DocId) -> UpdateGuard<'_> {
        self.update_locks.guard(id)
    }

    pub fn is_update_locked(&self, id: DocId) -> bool {
        self.update_locks.is_locked(id)
    }

    pub fn locked_update_count(&self) -> usize {
        self.update_locks.len()
    }

    /// Truncate the data file and the hash table in place.
    ///
    /// Both are attempted even if the first fails. Whichever succeeded stays
    /// cleared, so a failed clear may leave the partition half empty.
    ///
    /// If only the store was cleared, the index keeps offsets into space the
    /// store hands out again. Reads through such an entry may then land on a
    /// newer document: its payload, or a corruption error when the offset
    /// falls inside a slot. Retry `clear` until it succeeds before using the
    /// partition again.
    pub fn clear(&self) -> PartitionResult<()> {
        let store = self.store.clear().err();
        let index = self.index.clear().err();
        self.settle("clearing", Event::PartitionClear, Event::PartitionClearFailed, store, index)
    }

    /// Flush and release both files. Both are attempted even if the first
    /// fails.
    pub fn close(&self) -> PartitionResult<()> {
        let store = self.store.close().err();
        let index = self.index.close().err();
        self.settle("closing", Event::PartitionClose, Event::PartitionCloseFailed, store, index)
    }

    fn settle(
        &self,
        operation: &'static str,
        done: Event,
        failed: Event,
        store: Option<StorageError>,
        index: Option<IndexError>,
    ) -> PartitionResult<()> {
        if let Some(ref e) = store {
            let path = self.store.path().display().to_string();
            let error = e.to_string();
            Logger::crit_no_repeat(
                failed.as_str(),
                &[("error", error.as_str()), ("path", path.as_str())],
            );
        }
        if let Some(ref e) = index {
            let path = self.index.path().display().to_string();
            let error = e.to_string();
            Logger::crit_no_repeat(
                failed.as_str(),
                &[("error", error.as_str()), ("path", path.as_str())],
            );
        }

        if store.is_none() && index.is_none() {
            log_event(
                done,
                &[("data", self.store.path().display().to_string().as_str())],
            );
            return Ok(());
        }
        Err(PartitionError::IoFailure {
            operation,
            store,
            index,
        })
    }
}
