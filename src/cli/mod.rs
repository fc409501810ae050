//! CLI module for partdb
//!
//! Read-only inspection of a partition on disk:
//! - count: approximate document count
//! - get: one document's payload
//! - scan: ids and lengths of one shard

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, PartitionArgs};
pub use commands::{count, get, run, run_command, scan};
pub use errors::{CliError, CliErrorCode, CliResult};
