//! Observable events
//!
//! Events are explicit and typed; each carries its own severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in partdb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Partition lifecycle
    /// Partition files opened
    PartitionOpen,
    /// Partition cleared
    PartitionClear,
    /// Clearing a collaborator failed
    PartitionClearFailed,
    /// Partition closed
    PartitionClose,
    /// Closing a collaborator failed
    PartitionCloseFailed,

    // Document operations
    /// Update moved a document to a new offset
    DocumentRelocated,
    /// Insert undone after the index rejected the new entry
    InsertRolledBack,
    /// A scanned entry could not be read and was skipped
    ScanReadFailed,
    /// Relocated payload has no index entry left pointing at it
    RelocationLost,

    // Data file
    /// Data file grown by one or more chunks
    DataFileGrow,
    /// Malformed slot or checksum mismatch
    DataFileCorruption,

    // Hash table
    /// Hash table file opened
    HashTableOpen,
    /// Overflow bucket appended to a chain
    HashBucketOverflow,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::PartitionOpen => "PARTITION_OPEN",
            Event::PartitionClear => "PARTITION_CLEAR",
            Event::PartitionClearFailed => "PARTITION_CLEAR_FAILED",
            Event::PartitionClose => "PARTITION_CLOSE",
            Event::PartitionCloseFailed => "PARTITION_CLOSE_FAILED",

            Event::DocumentRelocated => "DOCUMENT_RELOCATED",
            Event::InsertRolledBack => "INSERT_ROLLED_BACK",
            Event::ScanReadFailed => "SCAN_READ_FAILED",
            Event::RelocationLost => "RELOCATION_LOST",

            Event::DataFileGrow => "DATA_FILE_GROW",
            Event::DataFileCorruption => "DATA_FILE_CORRUPTION",

            Event::HashTableOpen => "HASH_TABLE_OPEN",
            Event::HashBucketOverflow => "HASH_BUCKET_OVERFLOW",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::DocumentRelocated | Event::DataFileGrow | Event::HashBucketOverflow => {
                Severity::Trace
            }
            Event::InsertRolledBack => Severity::Warn,
            Event::PartitionClearFailed
            | Event::PartitionCloseFailed
            | Event::ScanReadFailed
            | Event::RelocationLost => Severity::Error,
            Event::DataFileCorruption => Severity::Fatal,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
