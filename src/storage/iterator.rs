//! Slot Iterator
//!
//! Sequential iteration over all slots of a slot file.

use crate::error::Result;
use crate::record::SLOT_SIZE;

use super::slot_file::{SlotFile, SLOT_LEN};

/// Iterator over `(offset, slot bytes)` in file order, tombstones included
pub struct SlotIterator<'a> {
    file: &'a SlotFile,
    /// Stop reading at this offset (file length when the iterator was made)
    end_offset: u64,
    /// Offset of the next slot to read
    current_offset: u64,
    /// Set after an I/O failure; the iterator then yields nothing more
    failed: bool,
}

impl<'a> SlotIterator<'a> {
    pub(super) fn new(file: &'a SlotFile, end_offset: u64) -> Self {
        Self {
            file,
            end_offset,
            current_offset: 0,
            failed: false,
        }
    }
}

impl<'a> Iterator for SlotIterator<'a> {
    type Item = Result<(u64, [u8; SLOT_SIZE])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.current_offset >= self.end_offset {
            return None;
        }

        let offset = self.current_offset;
        match self.file.read_slot(offset) {
            Ok(slot) => {
                self.current_offset += SLOT_LEN;
                Some(Ok((offset, slot)))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = ((self.end_offset - self.current_offset) / SLOT_LEN) as usize;
        (0, Some(remaining))
    }
}
