//! Shared handle: one writer or many readers over a whole service.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::engine::{BatchOutcome, RestoreSummary, Stats};
use crate::error::Result;
use crate::record::{Assignment, Attribute, AttributeValue, Predicate, Record};

use super::RecordService;

/// Clonable, thread-safe handle around a [`RecordService`]
///
/// ## Concurrency:
/// - Mutations take the write lock for their whole duration, so a purge can
///   never run while another thread holds offsets.
/// - Queries take the read lock and return owned results.
pub struct SharedService<S> {
    inner: Arc<RwLock<S>>,
}

impl<S> Clone for SharedService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: RecordService> SharedService<S> {
    pub fn new(service: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(service)),
        }
    }

    pub fn create(&self, record: Record) -> Result<i32> {
        self.inner.write().create(record)
    }

    /// All live records, collected under one read lock
    pub fn read_all(&self) -> Result<Vec<Record>> {
        let service = self.inner.read();
        let records = service.read_all()?.collect::<Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn find_by_attribute(
        &self,
        attribute: Attribute,
        value: &AttributeValue,
    ) -> Result<Vec<Record>> {
        self.inner.read().find_by_attribute(attribute, value)
    }

    pub fn delete(&self, predicate: &Predicate) -> Result<BatchOutcome> {
        self.inner.write().delete(predicate)
    }

    pub fn purge(&self) -> Result<()> {
        self.inner.write().purge()
    }

    pub fn insert_with_id(&self, record: Record) -> Result<()> {
        self.inner.write().insert_with_id(record)
    }

    /// Run an update to completion under the write lock
    pub fn update(&self, predicates: &[Predicate], edits: &[Assignment]) -> Result<BatchOutcome> {
        let mut service = self.inner.write();
        let outcomes = service.update(predicates, edits)?.collect();
        Ok(outcomes)
    }

    pub fn restore(&self, records: Vec<Record>) -> Result<RestoreSummary> {
        self.inner.write().restore(records)
    }

    pub fn stats(&self) -> Stats {
        self.inner.read().stats()
    }
}
