//! Slot File
//!
//! Random-access byte storage for fixed-size slots.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::SyncStrategy;
use crate::error::{Result, RosterError};
use crate::record::SLOT_SIZE;

use super::SlotIterator;

/// Size of one slot as a file offset
pub(crate) const SLOT_LEN: u64 = SLOT_SIZE as u64;

/// Owns the backing file of a record store
///
/// ## Concurrency:
/// - Reads take `&self`; the handle sits behind a Mutex because seek + read
///   must not interleave.
/// - Writes take `&mut self`, so the engine owner is the only writer.
pub struct SlotFile {
    /// Path of the backing file
    path: PathBuf,

    /// File handle (read + write)
    file: Mutex<File>,

    /// Current length in bytes
    len: u64,

    /// Durability of each write
    sync_strategy: SyncStrategy,
}

impl SlotFile {
    /// Open the backing file, creating it when `create` is set
    ///
    /// Fails with `CorruptStore` when the length is not a slot multiple.
    pub fn open(path: &Path, create: bool, sync_strategy: SyncStrategy) -> Result<Self> {
        if !create && !path.exists() {
            return Err(RosterError::Config(format!(
                "record file {} does not exist",
                path.display()
            )));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();
        check_alignment(len)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            len,
            sync_strategy,
        })
    }

    /// Create an empty file at `path`, truncating anything already there
    pub fn create_empty(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            len: 0,
            sync_strategy,
        })
    }

    /// Read the slot starting at `offset`
    pub fn read_slot(&self, offset: u64) -> Result<[u8; SLOT_SIZE]> {
        self.check_offset(offset)?;

        let mut slot = [0u8; SLOT_SIZE];
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut slot)?;

        Ok(slot)
    }

    /// Overwrite the slot starting at `offset`
    pub fn write_slot(&mut self, offset: u64, slot: &[u8]) -> Result<()> {
        check_slot(slot)?;
        self.check_offset(offset)?;

        let file = self.file.get_mut();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(slot)?;
        self.flush()
    }

    /// Append a slot at the end of the file, returning its offset
    pub fn append(&mut self, slot: &[u8]) -> Result<u64> {
        check_slot(slot)?;

        let offset = self.len;
        let file = self.file.get_mut();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(slot)?;
        self.len += SLOT_LEN;
        self.flush()?;

        Ok(offset)
    }

    /// Replace this file with `other`, renaming it over our path
    ///
    /// Afterwards this accessor serves the new contents; `other`'s path is gone.
    pub fn replace_with(&mut self, mut other: SlotFile) -> Result<()> {
        other.file.get_mut().sync_all()?;
        fs::rename(&other.path, &self.path)?;

        self.file = other.file;
        self.len = other.len;
        Ok(())
    }

    /// Force file contents to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.get_mut().sync_all()?;
        Ok(())
    }

    /// Lazy iterator over every slot from offset 0
    pub fn iter(&self) -> Result<SlotIterator<'_>> {
        check_alignment(self.len)?;
        Ok(SlotIterator::new(self, self.len))
    }

    /// File length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots (live and tombstoned)
    pub fn slot_count(&self) -> u64 {
        self.len / SLOT_LEN
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn flush(&mut self) -> Result<()> {
        let file = self.file.get_mut();
        file.flush()?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            file.sync_data()?;
        }
        Ok(())
    }

    fn check_offset(&self, offset: u64) -> Result<()> {
        if offset % SLOT_LEN != 0 || offset + SLOT_LEN > self.len {
            return Err(RosterError::CorruptStore(format!(
                "offset {} is not a slot boundary inside a {} byte store",
                offset, self.len
            )));
        }
        Ok(())
    }
}

fn check_alignment(len: u64) -> Result<()> {
    if len % SLOT_LEN != 0 {
        return Err(RosterError::CorruptStore(format!(
            "store length {} is not a multiple of slot size {}",
            len, SLOT_LEN
        )));
    }
    Ok(())
}

fn check_slot(slot: &[u8]) -> Result<()> {
    if slot.len() != SLOT_SIZE {
        return Err(RosterError::CorruptStore(format!(
            "slot buffer is {} bytes, expected {}",
            slot.len(),
            SLOT_SIZE
        )));
    }
    Ok(())
}
