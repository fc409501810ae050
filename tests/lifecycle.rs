//! Partition Lifecycle Tests
//!
//! Tests for:
//! - Clear empties both collaborators and keeps the partition usable
//! - Close then reopen preserves every document
//! - Operations after close fail instead of touching the files
//! - Clear aggregates failures of both collaborators
//! - Hash table geometry is checked on reopen

use partdb::index::{HashIndex, IndexErrorCode};
use partdb::{Partition, PartitionConfig};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn test_config() -> PartitionConfig {
    PartitionConfig {
        data_file_growth: 4096,
        hash_bits: 5,
        per_bucket: 8,
        ..PartitionConfig::default()
    }
}

fn open_with(dir: &TempDir, config: &PartitionConfig) -> Partition {
    Partition::open(config, dir.path().join("data"), dir.path().join("index"))
        .expect("Failed to open partition")
}

// =============================================================================
// Clear
// =============================================================================

#[test]
fn test_clear_removes_everything() {
    let dir = TempDir::new().unwrap();
    let partition = open_with(&dir, &test_config());
    for id in 0..50u64 {
        partition.insert(id, b"doc").unwrap();
    }

    partition.clear().unwrap();

    assert!(partition.read(0).unwrap_err().is_no_such_document());
    assert_eq!(partition.approximate_count().unwrap(), 0);
    assert!(partition.index().get_partition(0, 1).unwrap().0.is_empty());
}

#[test]
fn test_clear_then_reuse_id() {
    let dir = TempDir::new().unwrap();
    let partition = open_with(&dir, &test_config());
    partition.insert(9, b"old").unwrap();

    partition.clear().unwrap();
    partition.insert(9, b"new").unwrap();

    assert_eq!(partition.read(9).unwrap(), b"new");
    assert_eq!(partition.index().get(9, 0).unwrap().len(), 1);
}

// =============================================================================
// Close / Reopen
// =============================================================================

#[test]
fn test_reopen_after_close_keeps_documents() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    {
        let partition = open_with(&dir, &config);
        partition.insert(1, b"one").unwrap();
        partition.insert(2, b"two").unwrap();
        partition.update(2, b"two, but much longer than before").unwrap();
        partition.insert(3, b"three").unwrap();
        partition.delete(3).unwrap();
        partition.close().unwrap();
    }

    let partition = open_with(&dir, &config);
    assert_eq!(partition.read(1).unwrap(), b"one");
    assert_eq!(partition.read(2).unwrap(), b"two, but much longer than before");
    assert!(partition.read(3).unwrap_err().is_no_such_document());

    // Appends continue after the reopened data
    partition.insert(4, b"four").unwrap();
    assert_eq!(partition.read(1).unwrap(), b"one");
    assert_eq!(partition.read(4).unwrap(), b"four");
}

#[test]
fn test_operations_after_close_fail() {
    let dir = TempDir::new().unwrap();
    let partition = open_with(&dir, &test_config());
    partition.insert(1, b"one").unwrap();
    partition.close().unwrap();

    assert!(partition.read(1).unwrap_err().is_io_failure());
    assert!(partition.insert(2, b"two").unwrap_err().is_io_failure());
}

#[test]
fn test_second_close_is_harmless() {
    let dir = TempDir::new().unwrap();
    let partition = open_with(&dir, &test_config());
    partition.close().unwrap();
    partition.close().unwrap();
}

#[test]
fn test_clear_after_close_reports_both_collaborators() {
    let dir = TempDir::new().unwrap();
    let partition = open_with(&dir, &test_config());
    partition.close().unwrap();

    let err = partition.clear().unwrap_err();
    assert_eq!(err.to_string(), "I/O failure while clearing partition");
    assert!(err.store_cause().is_some());
    assert!(err.index_cause().is_some());
}

#[test]
fn test_reopen_with_other_geometry_is_rejected() {
    let dir = TempDir::new().unwrap();
    open_with(&dir, &test_config()).close().unwrap();

    let other = PartitionConfig {
        hash_bits: 7,
        ..test_config()
    };
    let err = match Partition::open(&other, dir.path().join("data"), dir.path().join("index")) {
        Ok(_) => panic!("geometry mismatch accepted"),
        Err(e) => e,
    };
    let cause = err.index_cause().expect("index error");
    assert_eq!(cause.code(), IndexErrorCode::PdbIndexConfigMismatch);
}

#[test]
fn test_invalid_config_is_rejected_before_opening() {
    let dir = TempDir::new().unwrap();
    let config = PartitionConfig {
        hash_bits: 0,
        ..test_config()
    };

    let result = Partition::open(&config, dir.path().join("data"), dir.path().join("index"));
    assert_eq!(result.err().map(|e| e.code()), Some("PDB_CONFIG_ERROR"));
    assert!(!dir.path().join("data").exists());
}
