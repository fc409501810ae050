//! Partition CRUD Tests
//!
//! Tests for:
//! - Insert/read round trip through the file-backed collaborators
//! - Delete visibility
//! - Relocation keeps exactly one index entry per document
//! - Checksum failures surface as errors, never as data

use partdb::index::HashIndex;
use partdb::storage::{RecordStore, StorageErrorCode, SLOT_HEADER_SIZE};
use partdb::{Partition, PartitionConfig, PartitionError};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn test_config() -> PartitionConfig {
    PartitionConfig {
        data_file_growth: 4096,
        doc_max_room: 64 * 1024,
        hash_bits: 6,
        per_bucket: 4,
    }
}

fn open_partition(dir: &TempDir) -> Partition {
    Partition::open(&test_config(), dir.path().join("data"), dir.path().join("index"))
        .expect("Failed to open partition")
}

// =============================================================================
// Insert / Read
// =============================================================================

#[test]
fn test_insert_then_read_returns_payload() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    partition.insert(1, br#"{"name":"one"}"#).unwrap();
    partition.insert(2, b"").unwrap();

    assert_eq!(partition.read(1).unwrap(), br#"{"name":"one"}"#);
    assert_eq!(partition.read(2).unwrap(), b"");
}

#[test]
fn test_insert_returns_offset_recorded_in_index() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    let first = partition.insert(10, b"first").unwrap();
    let second = partition.insert(11, b"second").unwrap();

    assert_ne!(first, second);
    assert_eq!(partition.index().get(10, 0).unwrap(), vec![first]);
    assert_eq!(partition.index().get(11, 0).unwrap(), vec![second]);
}

#[test]
fn test_many_ids_share_buckets() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    // 64 head buckets of 4 entries: overflow chains are needed
    for id in 0..1000u64 {
        partition.insert(id, format!("doc-{}", id).as_bytes()).unwrap();
    }
    for id in (0..1000u64).step_by(37) {
        assert_eq!(partition.read(id).unwrap(), format!("doc-{}", id).as_bytes());
    }
}

#[test]
fn test_read_unknown_id() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    let err = partition.read(404).unwrap_err();
    assert!(matches!(err, PartitionError::NoSuchDocument(404)));
    assert_eq!(err.code(), "PDB_NO_SUCH_DOCUMENT");
}

#[test]
fn test_oversized_document_is_rejected() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    let err = partition.insert(1, &vec![0u8; 64 * 1024]).unwrap_err();
    let cause = err.store_cause().expect("store error");
    assert_eq!(cause.code(), StorageErrorCode::PdbDocumentTooLarge);
    assert!(partition.index().get(1, 0).unwrap().is_empty());
}

// =============================================================================
// Update
// =============================================================================

#[test]
fn test_update_in_place() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    let offset = partition.insert(3, b"0123456789").unwrap();
    partition.update(3, b"short").unwrap();

    assert_eq!(partition.read(3).unwrap(), b"short");
    assert_eq!(partition.index().get(3, 0).unwrap(), vec![offset]);
}

#[test]
fn test_relocating_update_leaves_one_index_entry() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    let offset = partition.insert(7, b"a").unwrap();
    partition.insert(8, b"neighbour").unwrap();
    let grown = vec![b'x'; 500];
    partition.update(7, &grown).unwrap();

    let offsets = partition.index().get(7, 0).unwrap();
    assert_eq!(offsets.len(), 1, "relocation must not leave a stale pair");
    assert_ne!(offsets[0], offset);
    assert_eq!(partition.read(7).unwrap(), grown);
    assert_eq!(partition.store().read(offset).unwrap(), None);
    assert_eq!(partition.read(8).unwrap(), b"neighbour");
}

#[test]
fn test_update_unknown_id() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    assert!(partition.update(99, b"x").unwrap_err().is_no_such_document());
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete_then_read_fails() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    partition.insert(5, b"doomed").unwrap();
    partition.delete(5).unwrap();

    assert!(partition.read(5).unwrap_err().is_no_such_document());
    assert!(partition.index().get(5, 0).unwrap().is_empty());
}

#[test]
fn test_delete_twice() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    partition.insert(6, b"once").unwrap();
    partition.delete(6).unwrap();
    assert!(partition.delete(6).unwrap_err().is_no_such_document());
}

#[test]
fn test_update_after_delete_fails() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    partition.insert(12, b"short-lived").unwrap();
    partition.delete(12).unwrap();

    let err = partition.update(12, b"revived").unwrap_err();
    assert!(err.is_no_such_document());
    assert!(partition.index().get(12, 0).unwrap().is_empty());
}

#[test]
fn test_delete_leaves_other_documents() {
    let dir = TempDir::new().unwrap();
    let partition = open_partition(&dir);

    for id in 0..20u64 {
        partition.insert(id, &id.to_le_bytes()).unwrap();
    }
    for id in (0..20u64).filter(|id| id % 2 == 0) {
        partition.delete(id).unwrap();
    }
    for id in 0..20u64 {
        let result = partition.read(id);
        if id % 2 == 0 {
            assert!(result.unwrap_err().is_no_such_document());
        } else {
            assert_eq!(result.unwrap(), id.to_le_bytes());
        }
    }
}

// =============================================================================
// Corruption
// =============================================================================

#[test]
fn test_corrupted_payload_is_reported() {
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("data");
    {
        let partition = open_partition(&dir);
        partition.insert(1, b"intact payload").unwrap();
        partition.close().unwrap();
    }

    let mut contents = fs::read(&data_path).unwrap();
    contents[SLOT_HEADER_SIZE as usize + 2] ^= 0xFF;
    fs::write(&data_path, contents).unwrap();

    let partition = open_partition(&dir);
    let err = partition.read(1).unwrap_err();
    let cause = err.store_cause().expect("store error");
    assert_eq!(cause.code(), StorageErrorCode::PdbDataCorruption);
    assert!(cause.is_fatal());
}
