//! Store statistics.

use std::fmt;

/// Live and tombstoned slot counts
///
/// After every completed operation `live + tombstoned` equals the number of
/// slots in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Slots holding a live record
    pub live: u64,

    /// Slots holding a deleted record, reclaimed by the next purge
    pub tombstoned: u64,
}

impl Stats {
    pub fn new(live: u64, tombstoned: u64) -> Self {
        Self { live, tombstoned }
    }

    /// Total slot count
    pub fn total(&self) -> u64 {
        self.live + self.tombstoned
    }

    pub(crate) fn record_created(&mut self) {
        self.live += 1;
    }

    pub(crate) fn record_deleted(&mut self) {
        self.live -= 1;
        self.tombstoned += 1;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "live={} tombstoned={}", self.live, self.tombstoned)
    }
}
