//! Snapshot Module
//!
//! Record-set files consumed by `restore`.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Header (22 bytes)                                                │
//! │   Magic: "RSNP" (4) | Version: u16 (2) | Count: u64 (8)          │
//! │   PayloadCRC: u32 (4) | PayloadLen: u32 (4)                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Payload: bincode-encoded Vec<Record>                             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};
use crate::record::Record;
use crate::service::RecordService;

/// Magic bytes identifying a snapshot file
const MAGIC: &[u8; 4] = b"RSNP";

/// Current snapshot format version
const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + Count (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 22;

/// An ordered set of records captured from, or destined for, a store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Capture every live record of a service
    pub fn capture<S: RecordService + ?Sized>(service: &S) -> Result<Self> {
        let records = service.read_all()?.collect::<Result<Vec<_>>>()?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the snapshot to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let payload = bincode::serialize(&self.records)?;
        let payload_len = u32::try_from(payload.len()).map_err(|_| {
            RosterError::Serialization(format!("snapshot payload of {} bytes", payload.len()))
        })?;
        let crc = crc32fast::hash(&payload);

        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&(self.records.len() as u64).to_le_bytes())?;
        writer.write_all(&crc.to_le_bytes())?;
        writer.write_all(&payload_len.to_le_bytes())?;
        writer.write_all(&payload)?;
        writer.flush()?;

        let file = writer.into_inner().map_err(|e| {
            RosterError::Serialization(format!("Failed to flush snapshot: {}", e))
        })?;
        file.sync_all()?;

        tracing::debug!("Saved snapshot of {} records to {}", self.len(), path.display());
        Ok(())
    }

    /// Read and verify a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;

        if bytes.len() < HEADER_SIZE {
            return Err(RosterError::CorruptStore(format!(
                "snapshot is {} bytes, shorter than its header",
                bytes.len()
            )));
        }

        let (header, payload) = bytes.split_at(HEADER_SIZE);
        if &header[0..4] != MAGIC {
            return Err(RosterError::CorruptStore(format!(
                "Invalid snapshot magic: expected RSNP, got {:?}",
                &header[0..4]
            )));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(RosterError::CorruptStore(format!(
                "Unsupported snapshot version: {}",
                version
            )));
        }

        let mut count = [0u8; 8];
        count.copy_from_slice(&header[6..14]);
        let count = u64::from_le_bytes(count);
        let crc = u32::from_le_bytes([header[14], header[15], header[16], header[17]]);
        let payload_len = u32::from_le_bytes([header[18], header[19], header[20], header[21]]);

        if payload.len() != payload_len as usize {
            return Err(RosterError::CorruptStore(format!(
                "snapshot payload is {} bytes, header says {}",
                payload.len(),
                payload_len
            )));
        }
        if crc32fast::hash(payload) != crc {
            return Err(RosterError::CorruptStore(
                "snapshot checksum mismatch".to_string(),
            ));
        }

        let records: Vec<Record> = bincode::deserialize(payload)?;
        if records.len() as u64 != count {
            return Err(RosterError::CorruptStore(format!(
                "snapshot holds {} records, header says {}",
                records.len(),
                count
            )));
        }

        Ok(Self { records })
    }
}

impl From<Vec<Record>> for Snapshot {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}
