//! Hash index error types
//!
//! Error codes:
//! - PDB_INDEX_IO_ERROR (ERROR)
//! - PDB_INDEX_CLOSED (ERROR)
//! - PDB_INDEX_INVALID_PARTITION (ERROR)
//! - PDB_INDEX_CONFIG_MISMATCH (FATAL)
//! - PDB_INDEX_CORRUPTION (FATAL)

use std::fmt;
use std::io;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the index stays usable
    Error,
    /// The index file cannot be used
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Disk I/O failure
    PdbIndexIoError,
    /// Operation attempted after `close`
    PdbIndexClosed,
    /// Shard number out of range
    PdbIndexInvalidPartition,
    /// File was created with different hash parameters
    PdbIndexConfigMismatch,
    /// Bad magic or truncated file
    PdbIndexCorruption,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::PdbIndexIoError => "PDB_INDEX_IO_ERROR",
            IndexErrorCode::PdbIndexClosed => "PDB_INDEX_CLOSED",
            IndexErrorCode::PdbIndexInvalidPartition => "PDB_INDEX_INVALID_PARTITION",
            IndexErrorCode::PdbIndexConfigMismatch => "PDB_INDEX_CONFIG_MISMATCH",
            IndexErrorCode::PdbIndexCorruption => "PDB_INDEX_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            IndexErrorCode::PdbIndexConfigMismatch | IndexErrorCode::PdbIndexCorruption => {
                Severity::Fatal
            }
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with context
#[derive(Debug)]
pub struct IndexError {
    /// Error code
    code: IndexErrorCode,
    /// Human-readable message
    message: String,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl IndexError {
    fn new(code: IndexErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: IndexErrorCode::PdbIndexIoError,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Operation attempted after `close`
    pub fn closed() -> Self {
        Self::new(IndexErrorCode::PdbIndexClosed, "Hash table is closed")
    }

    /// Shard arguments out of range
    pub fn invalid_partition(part: usize, total: usize) -> Self {
        Self::new(
            IndexErrorCode::PdbIndexInvalidPartition,
            format!("Partition {} of {} is out of range", part, total),
        )
    }

    /// File parameters differ from the configuration
    pub fn config_mismatch(reason: impl Into<String>) -> Self {
        Self::new(IndexErrorCode::PdbIndexConfigMismatch, reason)
    }

    /// Malformed file
    pub fn corruption(reason: impl Into<String>) -> Self {
        Self::new(IndexErrorCode::PdbIndexCorruption, reason)
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
