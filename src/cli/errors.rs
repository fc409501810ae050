//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit status.

use std::fmt;
use std::io;
use std::path::Path;

use crate::config::ConfigError;
use crate::partition::PartitionError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// stdout could not be written
    IoError,
    /// Data or index file does not exist
    MissingFile,
    /// Requested document does not exist
    NoSuchDocument,
    /// Partition operation failed
    PartitionFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PDB_CLI_CONFIG_ERROR",
            Self::IoError => "PDB_CLI_IO_ERROR",
            Self::MissingFile => "PDB_CLI_MISSING_FILE",
            Self::NoSuchDocument => "PDB_NO_SUCH_DOCUMENT",
            Self::PartitionFailed => "PDB_CLI_PARTITION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn missing_file(path: &Path) -> Self {
        Self::new(
            CliErrorCode::MissingFile,
            format!("{} does not exist", path.display()),
        )
    }

    pub fn partition_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::PartitionFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<PartitionError> for CliError {
    fn from(e: PartitionError) -> Self {
        match e {
            PartitionError::NoSuchDocument(_) => {
                Self::new(CliErrorCode::NoSuchDocument, e.to_string())
            }
            PartitionError::Config(inner) => inner.into(),
            other => Self::partition_failed(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
