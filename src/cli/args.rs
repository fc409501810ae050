//! CLI argument definitions using clap
//!
//! Commands:
//! - partdb count --data <path> --index <path> [--config <path>]
//! - partdb get --id <id> --data <path> --index <path> [--config <path>]
//! - partdb scan --shard <i> --of <n> --data <path> --index <path> [--config <path>]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// partdb - inspect a document partition on disk
#[derive(Parser, Debug)]
#[command(name = "partdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Also print INFO and TRACE log lines (to stdout, before the result)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Files making up one partition
#[derive(Args, Debug, Clone)]
pub struct PartitionArgs {
    /// Path to the data file
    #[arg(long)]
    pub data: PathBuf,

    /// Path to the hash table file
    #[arg(long)]
    pub index: PathBuf,

    /// Path to a JSON partition config (defaults apply when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the approximate number of documents
    Count {
        #[command(flatten)]
        files: PartitionArgs,
    },

    /// Print the payload of one document
    Get {
        /// Logical document ID
        #[arg(long)]
        id: u64,

        #[command(flatten)]
        files: PartitionArgs,
    },

    /// Print `id<TAB>length` for every document in one shard
    Scan {
        /// Shard number, counting from zero
        #[arg(long)]
        shard: usize,

        /// Total number of shards
        #[arg(long)]
        of: usize,

        #[command(flatten)]
        files: PartitionArgs,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from([
            "partdb", "scan", "--shard", "1", "--of", "4", "--data", "d", "--index", "i",
        ])
        .unwrap();
        match cli.command {
            Command::Scan { shard, of, files } => {
                assert_eq!((shard, of), (1, 4));
                assert!(files.config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_get_requires_id() {
        assert!(Cli::try_parse_from(["partdb", "get", "--data", "d", "--index", "i"]).is_err());
    }
}
