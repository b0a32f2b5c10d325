//! Engine Module
//!
//! The mutation engine that coordinates the slot file and the index set.
//!
//! ## Responsibilities
//! - Rebuild indexes and counters from the file on open
//! - Append, rewrite in place, tombstone and compact slots
//! - Keep the index set consistent with the file after every mutation
//!
//! ## Slot lifecycle
//! ```text
//! absent ──create──▶ live ──update──▶ live ──delete──▶ tombstoned ──purge──▶ absent
//! ```

mod stats;
mod update;

use std::fs;

use crate::config::{Config, SyncStrategy};
use crate::error::{Result, RosterError};
use crate::index::IndexSet;
use crate::record::codec;
use crate::record::{Attribute, AttributeValue, Predicate, Record};
use crate::storage::{SlotFile, SlotIterator};
use crate::validation::{DefaultValidator, RecordValidator};

pub use stats::Stats;
pub use update::Updates;

/// Per-record results of a batch operation: `Ok(id)` or the record's failure
pub type BatchOutcome = Vec<Result<i32>>;

/// Result of merging a record set into a store
#[derive(Debug, Default)]
pub struct RestoreSummary {
    /// Records whose identifier was live and were overwritten in place
    pub updated: usize,

    /// Records appended as new slots
    pub appended: usize,

    /// Records refused by validation, with their identifier
    pub rejected: Vec<(i32, RosterError)>,
}

/// The on-disk record store
///
/// ## Ownership Model
/// - The engine exclusively owns its file and its index set
/// - Mutations take `&mut self`; queries take `&self`
/// - Offsets cached by a caller are invalid after `purge` or `insert_with_id`
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Backing slot file (source of truth)
    file: SlotFile,

    /// Attribute value → slot offsets
    index: IndexSet,

    /// Live / tombstoned counters
    stats: Stats,

    /// Next engine-assigned identifier
    next_id: i32,

    /// Injected record checks
    validator: Box<dyn RecordValidator>,
}

impl Engine {
    /// Open or create a store with the default validator
    pub fn open(config: Config) -> Result<Self> {
        Self::with_validator(config, Box::new(DefaultValidator::default()))
    }

    /// Open or create a store with an injected validator
    ///
    /// On startup:
    /// 1. Create the parent directory if needed
    /// 2. Remove a compaction file left behind by an interrupted purge
    /// 3. Open the slot file (length must be a slot multiple)
    /// 4. Scan every slot to rebuild indexes, counters and the next id
    pub fn with_validator(config: Config, validator: Box<dyn RecordValidator>) -> Result<Self> {
        if config.create_if_missing {
            if let Some(parent) = config.data_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let compact_path = config.compact_path();
        if compact_path.exists() {
            tracing::warn!(
                "Removing leftover compaction file {}",
                compact_path.display()
            );
            fs::remove_file(&compact_path)?;
        }

        let file = SlotFile::open(
            &config.data_path,
            config.create_if_missing,
            config.sync_strategy,
        )?;

        let mut engine = Self {
            config,
            file,
            index: IndexSet::new(),
            stats: Stats::default(),
            next_id: 1,
            validator,
        };
        engine.load()?;

        tracing::info!(
            "Opened {} ({})",
            engine.config.data_path.display(),
            engine.stats
        );

        Ok(engine)
    }

    /// Open with a path (convenience method)
    pub fn open_path(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        Self::open(Config::builder().data_path(path).build())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lazily iterate live records in file order
    ///
    /// Each call starts again from offset 0.
    pub fn read_all(&self) -> Result<Records<'_>> {
        Ok(Records {
            slots: self.file.iter()?,
            failed: false,
        })
    }

    /// Live records whose `attribute` equals `value`
    ///
    /// Every indexed offset is re-read and re-checked, so entries kept for
    /// deleted slots never leak into the result.
    pub fn find_by_attribute(
        &self,
        attribute: Attribute,
        value: &AttributeValue,
    ) -> Result<Vec<Record>> {
        let predicate = Predicate::new(attribute, value.clone())?;
        Ok(self
            .live_matches(&predicate)?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Current live and tombstoned counts
    pub fn stats(&self) -> Stats {
        self.stats
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a new record, returning its identifier
    ///
    /// An identifier of `0` or less is replaced by an engine-assigned one.
    pub fn create(&mut self, mut record: Record) -> Result<i32> {
        record.ensure_present()?;

        if record.id <= 0 {
            record.id = self.next_id;
        }
        // Covers explicit ids and an assigned id once the counter saturates
        if self.live_record(record.id)?.is_some() {
            return Err(RosterError::DuplicateId(record.id));
        }

        self.validator.validate(&record)?;
        let offset = self.append_record(&record)?;

        tracing::debug!("Created record {} at offset {}", record.id, offset);
        Ok(record.id)
    }

    /// Tombstone every live record matching `predicate`
    ///
    /// Each match is reported on its own: a slot that is already deleted
    /// yields `AlreadyDeleted` while the other matches still proceed. Index
    /// entries of deleted slots stay until the next purge.
    pub fn delete(&mut self, predicate: &Predicate) -> Result<BatchOutcome> {
        let mut outcomes = Vec::new();

        for offset in self.index.lookup(predicate.value()) {
            let mut slot = self.file.read_slot(offset)?;
            let (record, tombstoned) = codec::decode(&slot)?;

            if !record.matches(predicate) {
                continue;
            }

            if tombstoned {
                tracing::warn!("Record {} at offset {} already deleted", record.id, offset);
                outcomes.push(Err(RosterError::AlreadyDeleted(record.id)));
                continue;
            }

            codec::mark_tombstoned(&mut slot);
            self.file.write_slot(offset, &slot)?;
            self.stats.record_deleted();

            tracing::debug!("Deleted record {} at offset {}", record.id, offset);
            outcomes.push(Ok(record.id));
        }

        Ok(outcomes)
    }

    /// Compact the file down to its live records
    ///
    /// Rebuilds the file and every index; surviving records get new offsets.
    pub fn purge(&mut self) -> Result<()> {
        let reclaimed = self.stats.tombstoned;
        let live = self.read_all()?.collect::<Result<Vec<_>>>()?;
        self.rebuild(live)?;

        tracing::info!("Purged {} deleted slots ({})", reclaimed, self.stats);
        Ok(())
    }

    /// Insert a record with a caller-chosen identifier in identifier order
    ///
    /// The file is rebuilt with the new record spliced in before the first
    /// record with a greater identifier. Deleted slots are reclaimed too.
    pub fn insert_with_id(&mut self, record: Record) -> Result<()> {
        record.ensure_present()?;
        require_id(&record)?;
        if self.live_record(record.id)?.is_some() {
            return Err(RosterError::DuplicateId(record.id));
        }
        self.validator.validate(&record)?;
        // Fail on overflowing fields before touching the file
        codec::encode(&record)?;

        let id = record.id;
        let mut live = self.read_all()?.collect::<Result<Vec<_>>>()?;
        let position = live
            .iter()
            .position(|r| r.id > id)
            .unwrap_or(live.len());
        live.insert(position, record);

        self.rebuild(live)?;

        tracing::debug!("Inserted record {} at position {}", id, position);
        Ok(())
    }

    /// Merge an external record set into the store
    ///
    /// A record whose identifier is live overwrites that slot in place;
    /// any other record is appended. Records without an identifier are
    /// rejected, so re-applying the same set changes nothing further.
    pub fn restore(&mut self, records: Vec<Record>) -> Result<RestoreSummary> {
        let mut summary = RestoreSummary::default();

        for record in records {
            let checked = record
                .ensure_present()
                .and_then(|_| require_id(&record))
                .and_then(|_| self.validator.validate(&record))
                .and_then(|_| codec::encode(&record).map(|_| ()));
            if let Err(e) = checked {
                tracing::warn!("Restore rejected record {}: {}", record.id, e);
                summary.rejected.push((record.id, e));
                continue;
            }

            if let Some((offset, current)) = self.live_record(record.id)? {
                if current != record {
                    self.rewrite(offset, &current, &record)?;
                }
                summary.updated += 1;
                continue;
            }

            self.append_record(&record)?;
            summary.appended += 1;
        }

        tracing::info!(
            "Restore finished: {} updated, {} appended, {} rejected",
            summary.updated,
            summary.appended,
            summary.rejected.len()
        );
        Ok(summary)
    }

    /// Sync the file and close the engine
    pub fn close(mut self) -> Result<()> {
        self.file.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Record file length in bytes
    pub fn file_len(&self) -> u64 {
        self.file.len()
    }

    /// Identifier the next auto-assigned record will get
    pub fn next_id(&self) -> i32 {
        self.next_id
    }

    /// Read-only view of the index set
    pub fn index(&self) -> &IndexSet {
        &self.index
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Scan the file once, indexing live slots and counting tombstones
    fn load(&mut self) -> Result<()> {
        let mut stats = Stats::default();
        let mut index = IndexSet::new();
        let mut max_id = 0;

        for entry in self.file.iter()? {
            let (offset, slot) = entry?;
            let (record, tombstoned) = codec::decode(&slot)?;
            max_id = max_id.max(record.id);

            if tombstoned {
                stats.tombstoned += 1;
            } else {
                index.add(&record, offset);
                stats.live += 1;
            }
        }

        self.stats = stats;
        self.index = index;
        self.next_id = max_id.saturating_add(1).max(1);
        Ok(())
    }

    /// Append one record and index it
    fn append_record(&mut self, record: &Record) -> Result<u64> {
        let slot = codec::encode(record)?;
        let offset = self.file.append(&slot)?;

        self.index.add(record, offset);
        self.stats.record_created();
        self.next_id = self.next_id.max(record.id.saturating_add(1));

        Ok(offset)
    }

    /// Overwrite a live slot and move its index entries to the new values
    fn rewrite(&mut self, offset: u64, old: &Record, new: &Record) -> Result<()> {
        let slot = codec::encode(new)?;
        self.file.write_slot(offset, &slot)?;

        self.index.remove(old, offset);
        self.index.add(new, offset);
        Ok(())
    }

    /// The live slot holding `id`, if any
    fn live_record(&self, id: i32) -> Result<Option<(u64, Record)>> {
        let predicate = Predicate::from(AttributeValue::Id(id));
        Ok(self.live_matches(&predicate)?.into_iter().next())
    }

    /// Re-read every indexed candidate and keep live, still-matching slots
    fn live_matches(&self, predicate: &Predicate) -> Result<Vec<(u64, Record)>> {
        let mut matches = Vec::new();
        for offset in self.index.lookup(predicate.value()) {
            let slot = self.file.read_slot(offset)?;
            let (record, tombstoned) = codec::decode(&slot)?;
            if !tombstoned && record.matches(predicate) {
                matches.push((offset, record));
            }
        }
        Ok(matches)
    }

    /// Offsets of every live slot, in file order
    fn live_offsets(&self) -> Result<Vec<u64>> {
        let mut offsets = Vec::new();
        for entry in self.file.iter()? {
            let (offset, slot) = entry?;
            if !codec::is_tombstoned(&slot)? {
                offsets.push(offset);
            }
        }
        Ok(offsets)
    }

    /// Replace the file with exactly `records`, rebuilding every index
    ///
    /// The new file is written next to the old one and renamed over it, so
    /// a failure before the swap leaves the store as it was.
    fn rebuild(&mut self, records: Vec<Record>) -> Result<()> {
        let compact_path = self.config.compact_path();

        let built = (|| {
            let mut scratch = SlotFile::create_empty(&compact_path, SyncStrategy::OsBuffered)?;
            let mut index = IndexSet::new();
            for record in &records {
                let slot = codec::encode(record)?;
                let offset = scratch.append(&slot)?;
                index.add(record, offset);
            }
            Ok::<_, RosterError>((scratch, index))
        })();

        let (scratch, index) = match built {
            Ok(parts) => parts,
            Err(e) => {
                let _ = fs::remove_file(&compact_path);
                return Err(e);
            }
        };

        self.file.replace_with(scratch)?;
        self.index = index;
        self.stats = Stats::new(records.len() as u64, 0);
        if let Some(max_id) = records.iter().map(|r| r.id).max() {
            self.next_id = self.next_id.max(max_id.saturating_add(1));
        }

        tracing::debug!("Rebuilt store with {} records", records.len());
        Ok(())
    }
}

/// Reject records that carry no caller-chosen identifier
pub(crate) fn require_id(record: &Record) -> Result<()> {
    if record.id <= 0 {
        return Err(RosterError::NullRecord(format!(
            "record needs an explicit identifier, got {}",
            record.id
        )));
    }
    Ok(())
}

// =============================================================================
// Records iterator
// =============================================================================

/// Lazy iterator over live records, returned by [`Engine::read_all`]
pub struct Records<'a> {
    slots: SlotIterator<'a>,
    failed: bool,
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let decoded = self
                .slots
                .next()?
                .and_then(|(_, slot)| codec::decode(&slot));

            match decoded {
                Ok((record, false)) => return Some(Ok(record)),
                Ok((_, true)) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
