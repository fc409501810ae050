//! Partition error types
//!
//! Error codes:
//! - PDB_NO_SUCH_DOCUMENT: no index entry, or the entry points at a deleted record
//! - PDB_IO_FAILURE: a record store or hash index operation failed
//! - PDB_CONFIG_ERROR: the partition could not be opened with the given config

use thiserror::Error;

use super::DocId;
use crate::config::ConfigError;
use crate::index::IndexError;
use crate::storage::StorageError;

/// Result type for partition operations
pub type PartitionResult<T> = Result<T, PartitionError>;

/// Partition errors
#[derive(Debug, Error)]
pub enum PartitionError {
    /// Logical ID does not resolve to a live document
    #[error("Document {0} does not exist")]
    NoSuchDocument(DocId),

    /// Record store failure, surfaced unchanged
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Hash index failure, surfaced unchanged
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Clear or close failed on at least one collaborator.
    ///
    /// Both collaborators were attempted; the one that succeeded is not
    /// rolled back, so a partial clear is possible.
    #[error("I/O failure while {operation} partition")]
    IoFailure {
        operation: &'static str,
        store: Option<StorageError>,
        index: Option<IndexError>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PartitionError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PartitionError::NoSuchDocument(_) => "PDB_NO_SUCH_DOCUMENT",
            PartitionError::Storage(_)
            | PartitionError::Index(_)
            | PartitionError::IoFailure { .. } => "PDB_IO_FAILURE",
            PartitionError::Config(_) => "PDB_CONFIG_ERROR",
        }
    }

    pub fn is_no_such_document(&self) -> bool {
        matches!(self, PartitionError::NoSuchDocument(_))
    }

    /// True for any collaborator failure
    pub fn is_io_failure(&self) -> bool {
        self.code() == "PDB_IO_FAILURE"
    }

    /// Record store cause of an aggregate failure
    pub fn store_cause(&self) -> Option<&StorageError> {
        match self {
            PartitionError::IoFailure { store, .. } => store.as_ref(),
            PartitionError::Storage(e) => Some(e),
            _ => None,
        }
    }

    /// Hash index cause of an aggregate failure
    pub fn index_cause(&self) -> Option<&IndexError> {
        match self {
            PartitionError::IoFailure { index, .. } => index.as_ref(),
            PartitionError::Index(e) => Some(e),
            _ => None,
        }
    }
}
