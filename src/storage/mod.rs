//! Storage Module
//!
//! Byte-level access to the single record file.
//!
//! ## Responsibilities
//! - Seek, read one slot, write one slot, append, length queries
//! - Flush every mutation before returning
//! - Swap in a rebuilt file after compaction
//!
//! ## File Format
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬─────
//! │ Slot 0       │ Slot 1       │ Slot 2       │ ...
//! └──────────────┴──────────────┴──────────────┴─────
//! ^ offset 0     ^ SLOT_SIZE    ^ 2 * SLOT_SIZE
//! ```
//! No header, no footer: the length is always a multiple of `SLOT_SIZE`.

mod iterator;
mod slot_file;

pub use iterator::SlotIterator;
pub use slot_file::SlotFile;
