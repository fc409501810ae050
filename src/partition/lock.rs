//! Exclusive-update lock table
//!
//! Per-document mutual exclusion for multi-step updates. An entry exists
//! only while some caller holds the document; waiters block on the entry's
//! one-shot release signal and then race for the slot again.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};

use super::DocId;

/// One-shot signal, triggered when the holder unlocks.
#[derive(Debug, Default)]
struct ReleaseSignal {
    released: Mutex<bool>,
    cond: Condvar,
}

impl ReleaseSignal {
    fn wait(&self) {
        let mut released = self.released.lock().unwrap();
        while !*released {
            released = self.cond.wait(released).unwrap();
        }
    }

    fn release(&self) {
        *self.released.lock().unwrap() = true;
        self.cond.notify_all();
    }
}

/// Registry of documents with an update in flight.
#[derive(Debug, Default)]
pub struct UpdateLockTable {
    slots: Mutex<HashMap<DocId, Arc<ReleaseSignal>>>,
}

impl UpdateLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the caller holds `id`.
    ///
    /// Never blocks on a different ID. Being woken does not grant the lock:
    /// another waiter may take the slot first, so the check is repeated.
    pub fn lock(&self, id: DocId) {
        loop {
            let signal = {
                let mut slots = self.slots.lock().unwrap();
                match slots.entry(id) {
                    Entry::Occupied(held) => Arc::clone(held.get()),
                    Entry::Vacant(slot) => {
                        slot.insert(Arc::new(ReleaseSignal::default()));
                        return;
                    }
                }
            };
            signal.wait();
        }
    }

    /// Release `id` and wake every waiter.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not locked.
    pub fn unlock(&self, id: DocId) {
        let signal = self.slots.lock().unwrap().remove(&id);
        match signal {
            Some(signal) => signal.release(),
            None => panic!("unlock_update({}) called on a document that is not locked", id),
        }
    }

    /// Acquire `id` and release it when the guard is dropped.
    pub fn guard(&self, id: DocId) -> UpdateGuard<'_> {
        self.lock(id);
        UpdateGuard { table: self, id }
    }

    pub fn is_locked(&self, id: DocId) -> bool {
        self.slots.lock().unwrap().contains_key(&id)
    }

    /// Number of documents currently locked
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scoped hold on one document's exclusive-update lock.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct UpdateGuard<'a> {
    table: &'a UpdateLockTable,
    id: DocId,
}

impl UpdateGuard<'_> {
    pub fn id(&self) -> DocId {
        self.id
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.table.unlock(self.id);
    }
}
