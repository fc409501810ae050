//! File-backed record store
//!
//! Slots are appended at the end of used data. The file grows in
//! zero-filled chunks, so the end of used data is the first zero header.
//! Updates that fit into the slot's room are written in place; larger
//! ones relocate the document to a fresh slot.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::errors::{StorageError, StorageResult};
use super::slot::{encode_slot, room_for, SlotHeader, FLAG_DELETED, SLOT_HEADER_SIZE};
use super::store::RecordStore;
use crate::config::PartitionConfig;
use crate::observability::{log_event, Event};

/// Record store kept in a single data file.
pub struct DataFile {
    /// Path to the data file
    path: PathBuf,
    /// Largest room a slot may reserve
    doc_max_room: u64,
    /// Growth chunk in bytes
    growth: u64,
    state: Mutex<DataFileState>,
}

struct DataFileState {
    /// `None` once closed
    file: Option<File>,
    /// End of used data
    used: u64,
    /// Current file length
    size: u64,
}

fn read_exact_at(file: &mut File, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf)
}

fn write_all_at(file: &mut File, offset: u64, buf: &[u8]) -> std::io::Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(buf)
}

impl DataFileState {
    fn file(&mut self) -> StorageResult<&mut File> {
        self.file.as_mut().ok_or_else(StorageError::closed)
    }

    /// Header of the slot starting at `offset`, if one lies within used data.
    fn header_at(&mut self, offset: u64) -> StorageResult<Option<SlotHeader>> {
        if offset.checked_add(SLOT_HEADER_SIZE).map_or(true, |end| end > self.used) {
            return Ok(None);
        }
        let mut buf = [0u8; SLOT_HEADER_SIZE as usize];
        read_exact_at(self.file()?, offset, &mut buf).map_err(|e| {
            StorageError::read_failed(format!("Failed to read slot header at {}", offset), e)
        })?;
        let header = SlotHeader::decode(&buf);
        if header.is_end() || !header.is_well_formed() || offset + header.slot_len() > self.used {
            return Ok(None);
        }
        Ok(Some(header))
    }

    fn live_header_at(&mut self, offset: u64) -> StorageResult<Option<SlotHeader>> {
        Ok(self.header_at(offset)?.filter(SlotHeader::is_live))
    }

    /// Make sure the file is at least `required` bytes long.
    fn ensure_capacity(&mut self, required: u64, growth: u64, path: &Path) -> StorageResult<()> {
        if required <= self.size {
            return Ok(());
        }
        let chunks = (required - self.size + growth - 1) / growth;
        let new_size = self.size + chunks * growth;
        self.file()?.set_len(new_size).map_err(|e| {
            StorageError::io_error(format!("Failed to grow data file: {}", path.display()), e)
        })?;
        log_event(
            Event::DataFileGrow,
            &[
                ("path", path.display().to_string().as_str()),
                ("size", new_size.to_string().as_str()),
            ],
        );
        self.size = new_size;
        Ok(())
    }

    fn append(&mut self, data: &[u8], max_room: u64, growth: u64, path: &Path) -> StorageResult<u64> {
        let room = room_for(data.len());
        if room > max_room {
            return Err(StorageError::document_too_large(data.len(), max_room));
        }
        let slot = encode_slot(room as u32, data);
        let offset = self.used;
        self.ensure_capacity(offset + slot.len() as u64, growth, path)?;
        write_all_at(self.file()?, offset, &slot).map_err(|e| {
            StorageError::write_failed(format!("Failed to write slot at {}", offset), e)
        })?;
        self.used += slot.len() as u64;
        Ok(offset)
    }
}

impl DataFile {
    /// Opens or creates the data file at `path`.
    ///
    /// Creates parent directories if needed. An existing file is scanned
    /// slot by slot to find the end of used data.
    ///
    /// # Errors
    ///
    /// Returns `PDB_STORAGE_IO_ERROR` if the file cannot be opened or grown,
    /// and `PDB_DATA_CORRUPTION` if a slot header is malformed.
    pub fn open(path: impl AsRef<Path>, config: &PartitionConfig) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::io_error(
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
                StorageError::io_error(format!("Failed to open data file: {}", path.display()), e)
            })?;

        let size = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read file metadata", e))?
            .len();

        let mut state = DataFileState {
            file: Some(file),
            used: 0,
            size,
        };
        if size == 0 {
            state.ensure_capacity(config.data_file_growth, config.data_file_growth, &path)?;
        } else {
            state.used = Self::scan_used(&mut state, &path)?;
        }

        Ok(Self {
            path,
            doc_max_room: config.doc_max_room,
            growth: config.data_file_growth,
            state: Mutex::new(state),
        })
    }

    /// Walks slot headers from the start of the file until the first zero
    /// header.
    fn scan_used(state: &mut DataFileState, path: &Path) -> StorageResult<u64> {
        let size = state.size;
        let file = state.file()?;
        let mut offset = 0u64;
        let mut buf = [0u8; SLOT_HEADER_SIZE as usize];

        while offset + SLOT_HEADER_SIZE <= size {
            read_exact_at(file, offset, &mut buf).map_err(|e| {
                StorageError::read_failed(format!("Failed to scan {}", path.display()), e)
            })?;
            let header = SlotHeader::decode(&buf);
            if header.is_end() {
                break;
            }
            if !header.is_well_formed() || offset + header.slot_len() > size {
                log_event(
                    Event::DataFileCorruption,
                    &[
                        ("offset", offset.to_string().as_str()),
                        ("path", path.display().to_string().as_str()),
                    ],
                );
                return Err(StorageError::corruption_at_offset(offset, "Malformed slot header"));
            }
            offset += header.slot_len();
        }

        Ok(offset)
    }

    /// Returns the end of used data.
    pub fn used(&self) -> u64 {
        self.state.lock().unwrap().used
    }

    /// Returns the current file length.
    pub fn size(&self) -> u64 {
        self.state.lock().unwrap().size
    }
}

impl RecordStore for DataFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn insert(&self, data: &[u8]) -> StorageResult<u64> {
        let mut state = self.state.lock().unwrap();
        state.append(data, self.doc_max_room, self.growth, &self.path)
    }

    fn read(&self, offset: u64) -> StorageResult<Option<Vec<u8>>> {
        let mut state = self.state.lock().unwrap();
        let header = match state.live_header_at(offset)? {
            Some(header) => header,
            None => return Ok(None),
        };

        let mut payload = vec![0u8; header.length as usize];
        read_exact_at(state.file()?, offset + SLOT_HEADER_SIZE, &mut payload).map_err(|e| {
            StorageError::read_failed(format!("Failed to read slot payload at {}", offset), e)
        })?;

        if !header.verify(&payload) {
            log_event(
                Event::DataFileCorruption,
                &[
                    ("offset", offset.to_string().as_str()),
                    ("path", self.path.display().to_string().as_str()),
                ],
            );
            return Err(StorageError::corruption_at_offset(offset, "Checksum mismatch"));
        }
        Ok(Some(payload))
    }

    fn update(&self, offset: u64, data: &[u8]) -> StorageResult<u64> {
        let mut state = self.state.lock().unwrap();
        let header = state
            .live_header_at(offset)?
            .ok_or_else(|| StorageError::no_record(offset))?;

        if data.len() as u64 <= header.room as u64 {
            let slot = encode_slot(header.room, data);
            write_all_at(state.file()?, offset, &slot).map_err(|e| {
                StorageError::write_failed(format!("Failed to overwrite slot at {}", offset), e)
            })?;
            return Ok(offset);
        }

        // The old slot stays live until the new copy is written.
        let new_offset = state.append(data, self.doc_max_room, self.growth, &self.path)?;
        write_all_at(state.file()?, offset, &[FLAG_DELETED]).map_err(|e| {
            StorageError::write_failed(format!("Failed to retire slot at {}", offset), e)
        })?;
        Ok(new_offset)
    }

    fn delete(&self, offset: u64) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.live_header_at(offset)?.is_none() {
            return Ok(());
        }
        write_all_at(state.file()?, offset, &[FLAG_DELETED]).map_err(|e| {
            StorageError::write_failed(format!("Failed to delete slot at {}", offset), e)
        })
    }

    fn clear(&self) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        state.file()?.set_len(0).map_err(|e| {
            StorageError::io_error(format!("Failed to truncate {}", self.path.display()), e)
        })?;
        state.used = 0;
        state.size = 0;
        state.ensure_capacity(self.growth, self.growth, &self.path)
    }

    fn close(&self) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.file.take() {
            Some(file) => file.sync_all().map_err(|e| {
                StorageError::io_error(format!("Failed to sync {}", self.path.display()), e)
            }),
            None => Ok(()),
        }
    }
}
