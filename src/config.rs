//! Partition configuration
//!
//! Loaded from a JSON file; every field is optional and falls back to its
//! default. Derived constants (head bucket count, bucket size) are computed
//! from the configured values rather than stored.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event};

/// Bytes of one hash table entry: flag + key + value
pub const ENTRY_SIZE: u64 = 1 + 8 + 8;

/// Bytes of a bucket header: next bucket number
pub const BUCKET_HEADER_SIZE: u64 = 8;

/// Smallest supported `hash_bits`: 32 head buckets, so each of the 24
/// shards of the first cardinality sample covers at least one bucket
pub const MIN_HASH_BITS: u32 = 5;

/// Largest supported `hash_bits`
pub const MAX_HASH_BITS: u32 = 24;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Sizing parameters for a partition's data file and hash table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Largest room a single document slot may reserve (default 2 MiB)
    #[serde(default = "default_doc_max_room")]
    pub doc_max_room: u64,

    /// Data file growth chunk in bytes (default 32 MiB)
    #[serde(default = "default_data_file_growth")]
    pub data_file_growth: u64,

    /// log2 of the number of head buckets (default 12)
    #[serde(default = "default_hash_bits")]
    pub hash_bits: u32,

    /// Entries per hash bucket (default 16)
    #[serde(default = "default_per_bucket")]
    pub per_bucket: u32,
}

fn default_doc_max_room() -> u64 {
    2 * 1024 * 1024
}
fn default_data_file_growth() -> u64 {
    32 * 1024 * 1024
}
fn default_hash_bits() -> u32 {
    12
}
fn default_per_bucket() -> u32 {
    16
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            doc_max_room: default_doc_max_room(),
            data_file_growth: default_data_file_growth(),
            hash_bits: default_hash_bits(),
            per_bucket: default_per_bucket(),
        }
    }
}

impl PartitionConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = Self::from_json(&content)?;
        log_event(
            Event::ConfigLoaded,
            &[("path", path.display().to_string().as_str())],
        );
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: PartitionConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.doc_max_room == 0 || self.doc_max_room > u32::MAX as u64 {
            return Err(ConfigError::Invalid {
                field: "doc_max_room",
                reason: format!("must be between 1 and {}", u32::MAX),
            });
        }
        if self.data_file_growth == 0 {
            return Err(ConfigError::Invalid {
                field: "data_file_growth",
                reason: "must be > 0".to_string(),
            });
        }
        if self.hash_bits < MIN_HASH_BITS || self.hash_bits > MAX_HASH_BITS {
            return Err(ConfigError::Invalid {
                field: "hash_bits",
                reason: format!("must be between {} and {}", MIN_HASH_BITS, MAX_HASH_BITS),
            });
        }
        if self.per_bucket == 0 {
            return Err(ConfigError::Invalid {
                field: "per_bucket",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    /// Number of head buckets allocated when a hash table is created
    pub fn initial_buckets(&self) -> u64 {
        1u64 << self.hash_bits
    }

    /// Bytes of one bucket, header included
    pub fn bucket_size(&self) -> u64 {
        BUCKET_HEADER_SIZE + self.per_bucket as u64 * ENTRY_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = PartitionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_buckets(), 4096);
        assert_eq!(config.bucket_size(), 8 + 16 * 17);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = PartitionConfig::from_json("{}").unwrap();
        assert_eq!(config, PartitionConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = PartitionConfig::from_json(r#"{"hash_bits": 6, "per_bucket": 2}"#).unwrap();
        assert_eq!(config.hash_bits, 6);
        assert_eq!(config.per_bucket, 2);
        assert_eq!(config.doc_max_room, default_doc_max_room());
    }

    #[test]
    fn test_rejects_out_of_range_hash_bits() {
        let err = PartitionConfig::from_json(r#"{"hash_bits": 40}"#).unwrap_err();
        assert!(err.to_string().contains("hash_bits"));
    }

    #[test]
    fn test_rejects_too_few_head_buckets() {
        for bits in 0..MIN_HASH_BITS {
            let config = PartitionConfig {
                hash_bits: bits,
                ..PartitionConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Invalid { field: "hash_bits", .. })
            ));
        }
        let smallest = PartitionConfig {
            hash_bits: MIN_HASH_BITS,
            ..PartitionConfig::default()
        };
        assert!(smallest.validate().is_ok());
        assert_eq!(smallest.initial_buckets(), 32);
    }

    #[test]
    fn test_rejects_zero_growth() {
        let err = PartitionConfig::from_json(r#"{"data_file_growth": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "data_file_growth", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = PartitionConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("partdb.json");
        fs::write(&path, r#"{"per_bucket": 8}"#).unwrap();

        let config = PartitionConfig::load(&path).unwrap();
        assert_eq!(config.per_bucket, 8);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PartitionConfig::load(Path::new("/nonexistent/partdb.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
