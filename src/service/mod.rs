//! Service Module
//!
//! The record-store contract consumed by front ends (command line,
//! import/export layers).
//!
//! ## Implementations
//! - [`Engine`]: on-disk slot file with secondary indexes
//! - [`MemoryService`]: map keyed by identifier, no offsets, no compaction
//!
//! ## Wrappers
//! - [`Logged`] / [`Timed`]: implement the same trait and delegate
//! - [`SharedService`]: single-writer / multi-reader handle across threads

mod memory;
mod middleware;
mod shared;

use crate::engine::{BatchOutcome, Engine, RestoreSummary, Stats};
use crate::error::Result;
use crate::record::{Assignment, Attribute, AttributeValue, Predicate, Record};

pub use memory::MemoryService;
pub use middleware::{Logged, OperationTiming, Timed};
pub use shared::SharedService;

/// Boxed lazy sequence of live records
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record>> + 'a>;

/// Boxed lazy sequence of updated identifiers
pub type UpdateIter<'a> = Box<dyn Iterator<Item = Result<i32>> + 'a>;

/// Operations every record store offers
pub trait RecordService {
    /// Store a new record and return its identifier
    fn create(&mut self, record: Record) -> Result<i32>;

    /// Lazily iterate all live records
    fn read_all(&self) -> Result<RecordIter<'_>>;

    /// Live records whose `attribute` equals `value`
    fn find_by_attribute(
        &self,
        attribute: Attribute,
        value: &AttributeValue,
    ) -> Result<Vec<Record>>;

    /// Delete every live record matching `predicate`, reporting per record
    fn delete(&mut self, predicate: &Predicate) -> Result<BatchOutcome>;

    /// Reclaim space held by deleted records
    fn purge(&mut self) -> Result<()>;

    /// Insert a record under its own identifier, keeping identifier order
    fn insert_with_id(&mut self, record: Record) -> Result<()>;

    /// Edit every live record matching all `predicates`
    fn update(&mut self, predicates: &[Predicate], edits: &[Assignment])
        -> Result<UpdateIter<'_>>;

    /// Merge a record set: overwrite live identifiers, append the rest
    fn restore(&mut self, records: Vec<Record>) -> Result<RestoreSummary>;

    /// Live and tombstoned counts
    fn stats(&self) -> Stats;
}

impl RecordService for Engine {
    fn create(&mut self, record: Record) -> Result<i32> {
        Engine::create(self, record)
    }

    fn read_all(&self) -> Result<RecordIter<'_>> {
        Ok(Box::new(Engine::read_all(self)?))
    }

    fn find_by_attribute(
        &self,
        attribute: Attribute,
        value: &AttributeValue,
    ) -> Result<Vec<Record>> {
        Engine::find_by_attribute(self, attribute, value)
    }

    fn delete(&mut self, predicate: &Predicate) -> Result<BatchOutcome> {
        Engine::delete(self, predicate)
    }

    fn purge(&mut self) -> Result<()> {
        Engine::purge(self)
    }

    fn insert_with_id(&mut self, record: Record) -> Result<()> {
        Engine::insert_with_id(self, record)
    }

    fn update(
        &mut self,
        predicates: &[Predicate],
        edits: &[Assignment],
    ) -> Result<UpdateIter<'_>> {
        Ok(Box::new(Engine::update(self, predicates, edits)?))
    }

    fn restore(&mut self, records: Vec<Record>) -> Result<RestoreSummary> {
        Engine::restore(self, records)
    }

    fn stats(&self) -> Stats {
        Engine::stats(self)
    }
}

impl<S: RecordService + ?Sized> RecordService for Box<S> {
    fn create(&mut self, record: Record) -> Result<i32> {
        (**self).create(record)
    }

    fn read_all(&self) -> Result<RecordIter<'_>> {
        (**self).read_all()
    }

    fn find_by_attribute(
        &self,
        attribute: Attribute,
        value: &AttributeValue,
    ) -> Result<Vec<Record>> {
        (**self).find_by_attribute(attribute, value)
    }

    fn delete(&mut self, predicate: &Predicate) -> Result<BatchOutcome> {
        (**self).delete(predicate)
    }

    fn purge(&mut self) -> Result<()> {
        (**self).purge()
    }

    fn insert_with_id(&mut self, record: Record) -> Result<()> {
        (**self).insert_with_id(record)
    }

    fn update(
        &mut self,
        predicates: &[Predicate],
        edits: &[Assignment],
    ) -> Result<UpdateIter<'_>> {
        (**self).update(predicates, edits)
    }

    fn restore(&mut self, records: Vec<Record>) -> Result<RestoreSummary> {
        (**self).restore(records)
    }

    fn stats(&self) -> Stats {
        (**self).stats()
    }
}
