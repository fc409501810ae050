//! partdb - document partitions over a record store and a hash index
//!
//! A partition maps stable logical document IDs to the physical offsets of
//! their payloads and keeps that mapping correct across relocation.

pub mod cli;
pub mod config;
pub mod index;
pub mod observability;
pub mod partition;
pub mod storage;

pub use config::{ConfigError, PartitionConfig};
pub use index::{HashIndex, HashTable, IndexError};
pub use partition::{DocId, Partition, PartitionError, PartitionResult, UpdateGuard};
pub use storage::{DataFile, RecordStore, StorageError};
