//! File-backed chained hash table
//!
//! # File layout
//!
//! ```text
//! +---------------------------+
//! | Header (32 bytes)         |  magic, hash_bits, per_bucket, bucket count
//! +---------------------------+
//! | Bucket 0 .. 2^hash_bits-1 |  head buckets, allocated up front
//! +---------------------------+
//! | Overflow buckets          |  appended as chains fill up
//! +---------------------------+
//! ```
//!
//! A bucket is a next-bucket number (u64, 0 = end of chain) followed by
//! `per_bucket` entries of `flag u8 | key u64 | value u64`. Bucket 0 is a
//! head bucket and can never be a successor, so 0 is free to mean "none".

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::errors::{IndexError, IndexResult};
use super::hashing::{hash_key, partition_range};
use super::lookup::HashIndex;
use crate::config::{PartitionConfig, BUCKET_HEADER_SIZE, ENTRY_SIZE};
use crate::observability::{log_event, Event};

const MAGIC: [u8; 8] = *b"PDBHASH1";

/// Bytes before bucket 0
pub const FILE_HEADER_SIZE: u64 = 32;

const ENTRY_FREE: u8 = 0;
const ENTRY_LIVE: u8 = 1;

/// One decoded entry and where it lives in the file
#[derive(Debug, Clone, Copy)]
struct Entry {
    position: u64,
    live: bool,
    key: u64,
    value: u64,
}

/// Raw bucket bytes plus the geometry needed to decode them
struct Bucket {
    number: u64,
    bytes: Vec<u8>,
}

impl Bucket {
    fn next(&self) -> u64 {
        u64::from_le_bytes(self.bytes[0..8].try_into().unwrap_or([0; 8]))
    }

    fn entries(&self, bucket_offset: u64) -> impl Iterator<Item = Entry> + '_ {
        self.bytes[BUCKET_HEADER_SIZE as usize..]
            .chunks_exact(ENTRY_SIZE as usize)
            .enumerate()
            .map(move |(i, raw)| Entry {
                position: bucket_offset + BUCKET_HEADER_SIZE + i as u64 * ENTRY_SIZE,
                live: raw[0] == ENTRY_LIVE,
                key: u64::from_le_bytes(raw[1..9].try_into().unwrap_or([0; 8])),
                value: u64::from_le_bytes(raw[9..17].try_into().unwrap_or([0; 8])),
            })
    }
}

fn encode_entry(key: u64, value: u64) -> [u8; ENTRY_SIZE as usize] {
    let mut buf = [0u8; ENTRY_SIZE as usize];
    buf[0] = ENTRY_LIVE;
    buf[1..9].copy_from_slice(&key.to_le_bytes());
    buf[9..17].copy_from_slice(&value.to_le_bytes());
    buf
}

/// Hash index kept in a single file.
pub struct HashTable {
    path: PathBuf,
    hash_bits: u32,
    per_bucket: u32,
    bucket_size: u64,
    initial_buckets: u64,
    state: Mutex<HashTableState>,
}

struct HashTableState {
    /// `None` once closed
    file: Option<File>,
    /// Head and overflow buckets in the file
    num_buckets: u64,
}

impl HashTableState {
    fn file(&mut self) -> IndexResult<&mut File> {
        self.file.as_mut().ok_or_else(IndexError::closed)
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> IndexResult<()> {
        let file = self.file()?;
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.read_exact(buf))
            .map_err(|e| IndexError::io_error(format!("Failed to read at {}", offset), e))
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> IndexResult<()> {
        let file = self.file()?;
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.write_all(buf))
            .map_err(|e| IndexError::io_error(format!("Failed to write at {}", offset), e))
    }
}

impl HashTable {
    /// Opens or creates the hash table file at `path`.
    ///
    /// A new file gets `2^hash_bits` empty head buckets. An existing file must
    /// carry the same `hash_bits` and `per_bucket` as `config`.
    pub fn open(path: impl AsRef<Path>, config: &PartitionConfig) -> IndexResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    IndexError::io_error(
                        format!("Failed to create directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| {
                IndexError::io_error(format!("Failed to open hash table: {}", path.display()), e)
            })?;

        let len = file
            .metadata()
            .map_err(|e| IndexError::io_error("Failed to read file metadata", e))?
            .len();

        let table = Self {
            path,
            hash_bits: config.hash_bits,
            per_bucket: config.per_bucket,
            bucket_size: config.bucket_size(),
            initial_buckets: config.initial_buckets(),
            state: Mutex::new(HashTableState {
                file: Some(file),
                num_buckets: 0,
            }),
        };

        {
            let mut state = table.state.lock().unwrap();
            if len == 0 {
                table.initialize(&mut state)?;
            } else {
                table.load_header(&mut state, len)?;
            }
            log_event(
                Event::HashTableOpen,
                &[
                    ("buckets", state.num_buckets.to_string().as_str()),
                    ("path", table.path.display().to_string().as_str()),
                ],
            );
        }

        Ok(table)
    }

    fn encode_header(&self, num_buckets: u64) -> [u8; FILE_HEADER_SIZE as usize] {
        let mut buf = [0u8; FILE_HEADER_SIZE as usize];
        buf[0..8].copy_from_slice(&MAGIC);
        buf[8..12].copy_from_slice(&self.hash_bits.to_le_bytes());
        buf[12..16].copy_from_slice(&self.per_bucket.to_le_bytes());
        buf[16..24].copy_from_slice(&num_buckets.to_le_bytes());
        buf
    }

    /// Writes a fresh header and zeroed head buckets.
    fn initialize(&self, state: &mut HashTableState) -> IndexResult<()> {
        let header = self.encode_header(self.initial_buckets);
        state.write_at(0, &header)?;
        state
            .file()?
            .set_len(self.bucket_offset(self.initial_buckets))
            .map_err(|e| {
                IndexError::io_error(format!("Failed to size {}", self.path.display()), e)
            })?;
        state.num_buckets = self.initial_buckets;
        Ok(())
    }

    fn load_header(&self, state: &mut HashTableState, len: u64) -> IndexResult<()> {
        if len < FILE_HEADER_SIZE {
            return Err(IndexError::corruption(format!(
                "{} is shorter than its header",
                self.path.display()
            )));
        }
        let mut buf = [0u8; FILE_HEADER_SIZE as usize];
        state.read_at(0, &mut buf)?;
        if buf[0..8] != MAGIC {
            return Err(IndexError::corruption(format!(
                "{} is not a hash table file",
                self.path.display()
            )));
        }

        let hash_bits = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
        let per_bucket = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);
        if hash_bits != self.hash_bits || per_bucket != self.per_bucket {
            return Err(IndexError::config_mismatch(format!(
                "file has hash_bits={} per_bucket={}, config has hash_bits={} per_bucket={}",
                hash_bits, per_bucket, self.hash_bits, self.per_bucket
            )));
        }

        let mut count = [0u8; 8];
        count.copy_from_slice(&buf[16..24]);
        let num_buckets = u64::from_le_bytes(count);
        if num_buckets < self.initial_buckets || self.bucket_offset(num_buckets) > len {
            return Err(IndexError::corruption(format!(
                "bucket count {} does not match file length {}",
                num_buckets, len
            )));
        }
        state.num_buckets = num_buckets;
        Ok(())
    }

    fn bucket_offset(&self, number: u64) -> u64 {
        FILE_HEADER_SIZE + number * self.bucket_size
    }

    fn read_bucket(&self, state: &mut HashTableState, number: u64) -> IndexResult<Bucket> {
        if number >= state.num_buckets {
            return Err(IndexError::corruption(format!(
                "chain points at bucket {} beyond {}",
                number, state.num_buckets
            )));
        }
        let mut bytes = vec![0u8; self.bucket_size as usize];
        state.read_at(self.bucket_offset(number), &mut bytes)?;
        Ok(Bucket { number, bytes })
    }

    /// Visit every bucket in the chain starting at `head` until `visit`
    /// returns `false`.
    fn walk_chain<F>(&self, state: &mut HashTableState, head: u64, mut visit: F) -> IndexResult<()>
    where
        F: FnMut(&Bucket, u64) -> bool,
    {
        let mut number = head;
        loop {
            let bucket = self.read_bucket(state, number)?;
            if !visit(&bucket, self.bucket_offset(number)) {
                return Ok(());
            }
            match bucket.next() {
                0 => return Ok(()),
                next => number = next,
            }
        }
    }

    /// Appends an empty overflow bucket and links it after `tail`.
    fn grow_chain(&self, state: &mut HashTableState, tail: u64) -> IndexResult<u64> {
        let number = state.num_buckets;
        let zeroed = vec![0u8; self.bucket_size as usize];
        state.write_at(self.bucket_offset(number), &zeroed)?;
        state.num_buckets += 1;
        let header = self.encode_header(state.num_buckets);
        state.write_at(0, &header)?;
        state.write_at(self.bucket_offset(tail), &number.to_le_bytes())?;
        log_event(
            Event::HashBucketOverflow,
            &[
                ("bucket", number.to_string().as_str()),
                ("path", self.path.display().to_string().as_str()),
            ],
        );
        Ok(number)
    }

    /// Total number of buckets, overflow included.
    pub fn num_buckets(&self) -> u64 {
        self.state.lock().unwrap().num_buckets
    }

    /// Number of head buckets.
    pub fn initial_buckets(&self) -> u64 {
        self.initial_buckets
    }
}

impl HashIndex for HashTable {
    fn path(&self) -> &Path {
        &self.path
    }

    fn put(&self, key: u64, value: u64) -> IndexResult<()> {
        let mut state = self.state.lock().unwrap();
        let head = hash_key(key, self.hash_bits);

        let mut free_slot = None;
        let mut tail = head;
        self.walk_chain(&mut state, head, |bucket, offset| {
            tail = bucket.number;
            free_slot = bucket.entries(offset).find(|e| !e.live).map(|e| e.position);
            free_slot.is_none()
        })?;

        let position = match free_slot {
            Some(position) => position,
            None => {
                let number = self.grow_chain(&mut state, tail)?;
                self.bucket_offset(number) + BUCKET_HEADER_SIZE
            }
        };
        state.write_at(position, &encode_entry(key, value))
    }

    fn get(&self, key: u64, limit: usize) -> IndexResult<Vec<u64>> {
        let mut state = self.state.lock().unwrap();
        let head = hash_key(key, self.hash_bits);

        let mut values = Vec::new();
        self.walk_chain(&mut state, head, |bucket, offset| {
            for entry in bucket.entries(offset) {
                if entry.live && entry.key == key {
                    values.push(entry.value);
                    if limit > 0 && values.len() >= limit {
                        return false;
                    }
                }
            }
            true
        })?;
        Ok(values)
    }

    fn remove(&self, key: u64, value: u64) -> IndexResult<()> {
        let mut state = self.state.lock().unwrap();
        let head = hash_key(key, self.hash_bits);

        let mut found = None;
        self.walk_chain(&mut state, head, |bucket, offset| {
            found = bucket
                .entries(offset)
                .find(|e| e.live && e.key == key && e.value == value)
                .map(|e| e.position);
            found.is_none()
        })?;

        match found {
            Some(position) => state.write_at(position, &[ENTRY_FREE]),
            None => Ok(()),
        }
    }

    fn get_partition(&self, part: usize, total: usize) -> IndexResult<(Vec<u64>, Vec<u64>)> {
        if total == 0 || part >= total {
            return Err(IndexError::invalid_partition(part, total));
        }
        let mut state = self.state.lock().unwrap();
        let (start, end) = partition_range(self.initial_buckets, part as u64, total as u64);

        let mut keys = Vec::new();
        let mut values = Vec::new();
        for head in start..end {
            self.walk_chain(&mut state, head, |bucket, offset| {
                for entry in bucket.entries(offset).filter(|e| e.live) {
                    keys.push(entry.key);
                    values.push(entry.value);
                }
                true
            })?;
        }
        Ok((keys, values))
    }

    fn clear(&self) -> IndexResult<()> {
        let mut state = self.state.lock().unwrap();
        state.file()?.set_len(0).map_err(|e| {
            IndexError::io_error(format!("Failed to truncate {}", self.path.display()), e)
        })?;
        self.initialize(&mut state)
    }

    fn close(&self) -> IndexResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.file.take() {
            Some(file) => file.sync_all().map_err(|e| {
                IndexError::io_error(format!("Failed to sync {}", self.path.display()), e)
            }),
            None => Ok(()),
        }
    }
}
