//! In-memory record service.

use std::collections::BTreeMap;

use crate::engine::{require_id, BatchOutcome, RestoreSummary, Stats};
use crate::error::{Result, RosterError};
use crate::record::{codec, Assignment, Attribute, AttributeValue, Predicate, Record};
use crate::validation::{DefaultValidator, RecordValidator};

use super::{RecordIter, RecordService, UpdateIter};

/// Record service backed by an ordered map keyed by identifier
///
/// Deletes remove records immediately, so nothing is ever tombstoned and
/// `purge` has nothing to do.
pub struct MemoryService {
    records: BTreeMap<i32, Record>,
    next_id: i32,
    validator: Box<dyn RecordValidator>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::with_validator(Box::new(DefaultValidator::default()))
    }

    pub fn with_validator(validator: Box<dyn RecordValidator>) -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
            validator,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn store(&mut self, record: Record) {
        self.next_id = self.next_id.max(record.id.saturating_add(1));
        self.records.insert(record.id, record);
    }

    /// Run the validator and the same field limits a slot file enforces
    fn check(&self, record: &Record) -> Result<()> {
        self.validator.validate(record)?;
        codec::encode(record)?;
        Ok(())
    }

    fn edit(&mut self, mut record: Record, edits: &[Assignment]) -> Result<i32> {
        for edit in edits {
            record.apply(edit)?;
        }
        self.check(&record)?;

        let id = record.id;
        self.records.insert(id, record);
        Ok(id)
    }
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordService for MemoryService {
    fn create(&mut self, mut record: Record) -> Result<i32> {
        record.ensure_present()?;
        if record.id <= 0 {
            record.id = self.next_id;
        }
        if self.records.contains_key(&record.id) {
            return Err(RosterError::DuplicateId(record.id));
        }
        self.check(&record)?;

        let id = record.id;
        self.store(record);
        Ok(id)
    }

    fn read_all(&self) -> Result<RecordIter<'_>> {
        Ok(Box::new(self.records.values().cloned().map(Ok)))
    }

    fn find_by_attribute(
        &self,
        attribute: Attribute,
        value: &AttributeValue,
    ) -> Result<Vec<Record>> {
        let predicate = Predicate::new(attribute, value.clone())?;
        Ok(self
            .records
            .values()
            .filter(|r| r.matches(&predicate))
            .cloned()
            .collect())
    }

    fn delete(&mut self, predicate: &Predicate) -> Result<BatchOutcome> {
        let ids: Vec<i32> = self
            .records
            .values()
            .filter(|r| r.matches(predicate))
            .map(|r| r.id)
            .collect();

        for id in &ids {
            self.records.remove(id);
        }
        Ok(ids.into_iter().map(Ok).collect())
    }

    fn purge(&mut self) -> Result<()> {
        Ok(())
    }

    fn insert_with_id(&mut self, record: Record) -> Result<()> {
        record.ensure_present()?;
        require_id(&record)?;
        if self.records.contains_key(&record.id) {
            return Err(RosterError::DuplicateId(record.id));
        }
        self.check(&record)?;
        self.store(record);
        Ok(())
    }

    fn update(
        &mut self,
        predicates: &[Predicate],
        edits: &[Assignment],
    ) -> Result<UpdateIter<'_>> {
        if edits.iter().any(|e| e.attribute() == Attribute::Id) {
            return Err(RosterError::ImmutableId);
        }

        let matches: Vec<Record> = self
            .records
            .values()
            .filter(|r| r.matches_all(predicates))
            .cloned()
            .collect();

        let outcomes: Vec<Result<i32>> = matches
            .into_iter()
            .map(|record| self.edit(record, edits))
            .collect();
        Ok(Box::new(outcomes.into_iter()))
    }

    fn restore(&mut self, records: Vec<Record>) -> Result<RestoreSummary> {
        let mut summary = RestoreSummary::default();

        for record in records {
            let checked = record
                .ensure_present()
                .and_then(|_| require_id(&record))
                .and_then(|_| self.check(&record));
            if let Err(e) = checked {
                summary.rejected.push((record.id, e));
                continue;
            }

            if self.records.contains_key(&record.id) {
                summary.updated += 1;
            } else {
                summary.appended += 1;
            }
            self.store(record);
        }

        Ok(summary)
    }

    fn stats(&self) -> Stats {
        Stats::new(self.records.len() as u64, 0)
    }
}
