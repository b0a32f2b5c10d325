//! Slot codec
//!
//! Converts between a [`Record`] and its fixed-width slot.
//!
//! ## Slot Format (271 bytes, little endian)
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Header (4)      Tombstone: u8 (1) | Padding (3)              │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Id: i32 (4)                                                  │
//! │ FirstName: UTF-8, zero padded (120)                          │
//! │ LastName:  UTF-8, zero padded (120)                          │
//! │ BirthDate: Year i32 (4) | Month i32 (4) | Day i32 (4)        │
//! │ Experience: i16 (2)                                          │
//! │ Salary: i64 cents (8)                                        │
//! │ Rank: ASCII (1)                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store file is a plain sequence of slots from offset 0, no header and
//! no footer, so its length is always a multiple of [`SLOT_SIZE`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{Datelike, NaiveDate};

use crate::error::{Result, RosterError};

use super::{Rank, Record, Salary};

/// Byte capacity of each name field
pub const NAME_CAPACITY: usize = 120;

/// Tombstone flag (1) padded to a 4 byte header
pub const HEADER_SIZE: usize = 4;

const ID_SIZE: usize = 4;
const DATE_SIZE: usize = 12;
const EXPERIENCE_SIZE: usize = 2;
const SALARY_SIZE: usize = 8;
const RANK_SIZE: usize = 1;

/// Size of one encoded record
pub const SLOT_SIZE: usize = HEADER_SIZE
    + ID_SIZE
    + 2 * NAME_CAPACITY
    + DATE_SIZE
    + EXPERIENCE_SIZE
    + SALARY_SIZE
    + RANK_SIZE;

/// Tombstone byte of a live slot
pub const LIVE: u8 = 0;

/// Tombstone byte of a deleted slot
pub const TOMBSTONE: u8 = 1;

/// Encode a live record into a slot
pub fn encode(record: &Record) -> Result<Bytes> {
    encode_slot(record, false)
}

/// Encode a record with an explicit tombstone flag
pub fn encode_slot(record: &Record, tombstoned: bool) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(SLOT_SIZE);

    // Header
    buf.put_u8(if tombstoned { TOMBSTONE } else { LIVE });
    buf.put_bytes(0, HEADER_SIZE - 1);

    buf.put_i32_le(record.id);
    put_text(&mut buf, "first_name", &record.first_name)?;
    put_text(&mut buf, "last_name", &record.last_name)?;

    buf.put_i32_le(record.birth_date.year());
    buf.put_i32_le(record.birth_date.month() as i32);
    buf.put_i32_le(record.birth_date.day() as i32);

    buf.put_i16_le(record.experience);
    buf.put_i64_le(record.salary.cents());
    buf.put_u8(record.rank.as_byte());

    debug_assert_eq!(buf.len(), SLOT_SIZE);
    Ok(buf.freeze())
}

/// Decode a slot into its record and tombstone flag
pub fn decode(slot: &[u8]) -> Result<(Record, bool)> {
    if slot.len() != SLOT_SIZE {
        return Err(RosterError::CorruptStore(format!(
            "slot is {} bytes, expected {}",
            slot.len(),
            SLOT_SIZE
        )));
    }

    let mut buf = slot;

    let tombstoned = is_tombstoned(buf)?;
    buf.advance(HEADER_SIZE);

    let id = buf.get_i32_le();
    let first_name = take_text(&mut buf, "first_name")?;
    let last_name = take_text(&mut buf, "last_name")?;

    let year = buf.get_i32_le();
    let month = buf.get_i32_le();
    let day = buf.get_i32_le();
    let birth_date = u32::try_from(month)
        .ok()
        .zip(u32::try_from(day).ok())
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        .ok_or_else(|| {
            RosterError::CorruptStore(format!(
                "record {}: invalid birth date {}-{}-{}",
                id, year, month, day
            ))
        })?;

    let experience = buf.get_i16_le();
    let salary = Salary::from_cents(buf.get_i64_le());

    let rank_byte = buf.get_u8();
    let rank = Rank::from_byte(rank_byte).ok_or_else(|| {
        RosterError::CorruptStore(format!("record {}: invalid rank byte 0x{:02x}", id, rank_byte))
    })?;

    let record = Record {
        id,
        first_name,
        last_name,
        birth_date,
        experience,
        salary,
        rank,
    };

    Ok((record, tombstoned))
}

/// Read only the tombstone flag of a slot
pub fn is_tombstoned(slot: &[u8]) -> Result<bool> {
    match slot.first() {
        Some(&LIVE) => Ok(false),
        Some(&TOMBSTONE) => Ok(true),
        Some(other) => Err(RosterError::CorruptStore(format!(
            "unrecognized tombstone byte 0x{:02x}",
            other
        ))),
        None => Err(RosterError::CorruptStore("empty slot".to_string())),
    }
}

/// Flip a slot's tombstone flag in place
pub fn mark_tombstoned(slot: &mut [u8]) {
    if let Some(flag) = slot.first_mut() {
        *flag = TOMBSTONE;
    }
}

// =============================================================================
// Text fields
// =============================================================================

fn put_text(buf: &mut BytesMut, field: &'static str, text: &str) -> Result<()> {
    let bytes = text.as_bytes();
    if bytes.len() > NAME_CAPACITY {
        return Err(RosterError::FieldOverflow {
            field,
            len: bytes.len(),
            capacity: NAME_CAPACITY,
        });
    }
    // Decoding trims trailing padding, so such text could not be read back
    if text.ends_with(|c: char| c.is_control()) {
        return Err(RosterError::InvalidAttribute(format!(
            "{} ends with a control character",
            field
        )));
    }
    buf.put_slice(bytes);
    buf.put_bytes(0, NAME_CAPACITY - bytes.len());
    Ok(())
}

/// Decode a zero-padded name, trimming trailing non-printable bytes
fn take_text(buf: &mut &[u8], field: &'static str) -> Result<String> {
    let raw = &buf[..NAME_CAPACITY];
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |pos| pos + 1);
    let text = std::str::from_utf8(&raw[..end])
        .map_err(|e| RosterError::CorruptStore(format!("{} is not valid UTF-8: {}", field, e)))?;
    let text = text.trim_end_matches(|c: char| c.is_control()).to_string();
    buf.advance(NAME_CAPACITY);
    Ok(text)
}
