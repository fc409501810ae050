//! CLI command implementations
//!
//! Each command opens the partition, does its read-only work, writes the
//! result to the given output and closes the partition again. A failure to
//! close is reported even when the command itself succeeded.

use std::io::{self, Write};

use crate::config::PartitionConfig;
use crate::observability::{Logger, Severity};
use crate::partition::Partition;

use super::args::{Command, PartitionArgs};
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command against stdout
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    // Informational lines would interleave with the command's stdout
    Logger::set_min_severity(if cli.verbose { Severity::Trace } else { Severity::Warn });
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(cli.command, &mut out)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command, out: &mut impl Write) -> CliResult<()> {
    match cmd {
        Command::Count { files } => count(&files, out),
        Command::Get { id, files } => get(&files, id, out),
        Command::Scan { shard, of, files } => scan(&files, shard, of, out),
    }
}

fn open(files: &PartitionArgs) -> CliResult<Partition> {
    let config = match &files.config {
        Some(path) => PartitionConfig::load(path)?,
        None => PartitionConfig::default(),
    };
    // Opening would create an empty partition in place of a mistyped path
    for path in [&files.data, &files.index] {
        if !path.is_file() {
            return Err(CliError::missing_file(path));
        }
    }
    Ok(Partition::open(&config, &files.data, &files.index)?)
}

/// Open, run `body`, then close; the body's error wins over a close error.
fn with_partition<T>(
    files: &PartitionArgs,
    body: impl FnOnce(&Partition) -> CliResult<T>,
) -> CliResult<T> {
    let partition = open(files)?;
    let result = body(&partition);
    let closed = partition.close();
    let value = result?;
    closed?;
    Ok(value)
}

/// Print the approximate number of documents
pub fn count(files: &PartitionArgs, out: &mut impl Write) -> CliResult<()> {
    with_partition(files, |partition| {
        let count = partition.approximate_count()?;
        writeln!(out, "{}", count)?;
        Ok(())
    })
}

/// Print one document's payload, decoded as lossy UTF-8
pub fn get(files: &PartitionArgs, id: u64, out: &mut impl Write) -> CliResult<()> {
    with_partition(files, |partition| {
        let doc = partition.read(id)?;
        writeln!(out, "{}", String::from_utf8_lossy(&doc))?;
        Ok(())
    })
}

/// Print `id<TAB>length` for every document in shard `shard` of `of`
pub fn scan(files: &PartitionArgs, shard: usize, of: usize, out: &mut impl Write) -> CliResult<()> {
    with_partition(files, |partition| {
        let mut write_error = None;
        partition.for_each_document(shard, of, |id, doc| {
            match writeln!(out, "{}\t{}", id, doc.len()) {
                Ok(()) => true,
                Err(e) => {
                    write_error = Some(e);
                    false
                }
            }
        })?;
        match write_error {
            Some(e) => Err(CliError::from(e)),
            None => Ok(()),
        }
    })
}
