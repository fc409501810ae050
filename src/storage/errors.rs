//! Record store error types
//!
//! Error codes:
//! - PDB_STORAGE_IO_ERROR (ERROR severity)
//! - PDB_STORAGE_WRITE_FAILED (ERROR severity)
//! - PDB_STORAGE_READ_FAILED (ERROR severity)
//! - PDB_DOCUMENT_TOO_LARGE (ERROR severity)
//! - PDB_NO_RECORD (ERROR severity)
//! - PDB_STORAGE_CLOSED (ERROR severity)
//! - PDB_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, the store stays usable
    Error,
    /// The file can no longer be trusted
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

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure (open, grow, truncate, sync)
    PdbStorageIoError,
    /// Record write failed
    PdbStorageWriteFailed,
    /// Record read failed
    PdbStorageReadFailed,
    /// Payload exceeds the configured maximum room
    PdbDocumentTooLarge,
    /// No live record at the given offset
    PdbNoRecord,
    /// The store has been closed
    PdbStorageClosed,
    /// Checksum or header failure
    PdbDataCorruption,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::PdbStorageIoError => "PDB_STORAGE_IO_ERROR",
            StorageErrorCode::PdbStorageWriteFailed => "PDB_STORAGE_WRITE_FAILED",
            StorageErrorCode::PdbStorageReadFailed => "PDB_STORAGE_READ_FAILED",
            StorageErrorCode::PdbDocumentTooLarge => "PDB_DOCUMENT_TOO_LARGE",
            StorageErrorCode::PdbNoRecord => "PDB_NO_RECORD",
            StorageErrorCode::PdbStorageClosed => "PDB_STORAGE_CLOSED",
            StorageErrorCode::PdbDataCorruption => "PDB_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::PdbDataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error type with context
#[derive(Debug)]
pub struct StorageError {
    /// Error code
    code: StorageErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl StorageError {
    fn new(code: StorageErrorCode, message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source,
        }
    }

    /// Create a new storage I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StorageErrorCode::PdbStorageIoError, message, Some(source))
    }

    /// Create a new write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StorageErrorCode::PdbStorageWriteFailed, message, Some(source))
    }

    /// Create a new read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self::new(StorageErrorCode::PdbStorageReadFailed, message, Some(source))
    }

    /// Payload does not fit into any slot the store may allocate
    pub fn document_too_large(len: usize, max_room: u64) -> Self {
        Self::new(
            StorageErrorCode::PdbDocumentTooLarge,
            format!("Document of {} bytes exceeds maximum room {}", len, max_room),
            None,
        )
    }

    /// No live record at the offset
    pub fn no_record(offset: u64) -> Self {
        let mut err = Self::new(StorageErrorCode::PdbNoRecord, "No live record", None);
        err.details = Some(format!("byte_offset: {}", offset));
        err
    }

    /// Operation attempted after `close`
    pub fn closed() -> Self {
        Self::new(StorageErrorCode::PdbStorageClosed, "Data file is closed", None)
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        let mut err = Self::new(StorageErrorCode::PdbDataCorruption, reason, None);
        err.details = Some(format!("byte_offset: {}", offset));
        err
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
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

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
