//! Logging and timing wrappers.
//!
//! Both wrap any [`RecordService`], do their bookkeeping and delegate.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::engine::{BatchOutcome, RestoreSummary, Stats};
use crate::error::Result;
use crate::record::{Assignment, Attribute, AttributeValue, Predicate, Record};

use super::{RecordIter, RecordService, UpdateIter};

// =============================================================================
// Logged
// =============================================================================

/// Emits a `tracing` event for every call and its outcome
pub struct Logged<S> {
    inner: S,
}

impl<S: RecordService> Logged<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn log_outcome<T>(operation: &str, result: &Result<T>) {
    match result {
        Ok(_) => tracing::debug!(operation, "ok"),
        Err(e) => tracing::warn!(operation, error = %e, "failed"),
    }
}

impl<S: RecordService> RecordService for Logged<S> {
    fn create(&mut self, record: Record) -> Result<i32> {
        tracing::info!("create {} {}", record.first_name, record.last_name);
        let result = self.inner.create(record);
        log_outcome("create", &result);
        result
    }

    fn read_all(&self) -> Result<RecordIter<'_>> {
        tracing::info!("read_all");
        let result = self.inner.read_all();
        log_outcome("read_all", &result);
        result
    }

    fn find_by_attribute(
        &self,
        attribute: Attribute,
        value: &AttributeValue,
    ) -> Result<Vec<Record>> {
        tracing::info!("find_by_attribute {}={}", attribute, value);
        let result = self.inner.find_by_attribute(attribute, value);
        if let Ok(found) = &result {
            tracing::debug!("find_by_attribute matched {} records", found.len());
        }
        log_outcome("find_by_attribute", &result);
        result
    }

    fn delete(&mut self, predicate: &Predicate) -> Result<BatchOutcome> {
        tracing::info!("delete where {}", predicate);
        let result = self.inner.delete(predicate);
        if let Ok(outcomes) = &result {
            for failure in outcomes.iter().filter_map(|o| o.as_ref().err()) {
                tracing::warn!("delete: {}", failure);
            }
        }
        log_outcome("delete", &result);
        result
    }

    fn purge(&mut self) -> Result<()> {
        tracing::info!("purge");
        let result = self.inner.purge();
        log_outcome("purge", &result);
        result
    }

    fn insert_with_id(&mut self, record: Record) -> Result<()> {
        tracing::info!("insert_with_id {}", record.id);
        let result = self.inner.insert_with_id(record);
        log_outcome("insert_with_id", &result);
        result
    }

    fn update(
        &mut self,
        predicates: &[Predicate],
        edits: &[Assignment],
    ) -> Result<UpdateIter<'_>> {
        tracing::info!(
            "update set {} where {}",
            join(edits),
            join(predicates)
        );
        let result = self.inner.update(predicates, edits);
        log_outcome("update", &result);
        result
    }

    fn restore(&mut self, records: Vec<Record>) -> Result<RestoreSummary> {
        tracing::info!("restore {} records", records.len());
        let result = self.inner.restore(records);
        log_outcome("restore", &result);
        result
    }

    fn stats(&self) -> Stats {
        let stats = self.inner.stats();
        tracing::debug!("stats {}", stats);
        stats
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

// =============================================================================
// Timed
// =============================================================================

/// Accumulated timings of one operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationTiming {
    pub calls: u64,
    pub total: Duration,
}

/// Measures every call and keeps per-operation totals
///
/// `read_all` and `update` return lazy sequences; their timing covers
/// setup only, not consumption.
pub struct Timed<S> {
    inner: S,
    timings: Mutex<BTreeMap<&'static str, OperationTiming>>,
}

impl<S: RecordService> Timed<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            timings: Mutex::new(BTreeMap::new()),
        }
    }

    /// Timings recorded so far, by operation name
    pub fn timings(&self) -> BTreeMap<&'static str, OperationTiming> {
        self.timings.lock().clone()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn measure<T>(
    timings: &Mutex<BTreeMap<&'static str, OperationTiming>>,
    operation: &'static str,
    f: impl FnOnce() -> T,
) -> T {
    let start = Instant::now();
    let out = f();
    let elapsed = start.elapsed();

    tracing::debug!(operation, elapsed_us = elapsed.as_micros() as u64, "timed");

    let mut timings = timings.lock();
    let timing = timings.entry(operation).or_default();
    timing.calls += 1;
    timing.total += elapsed;

    out
}

impl<S: RecordService> RecordService for Timed<S> {
    fn create(&mut self, record: Record) -> Result<i32> {
        let inner = &mut self.inner;
        measure(&self.timings, "create", || inner.create(record))
    }

    fn read_all(&self) -> Result<RecordIter<'_>> {
        measure(&self.timings, "read_all", || self.inner.read_all())
    }

    fn find_by_attribute(
        &self,
        attribute: Attribute,
        value: &AttributeValue,
    ) -> Result<Vec<Record>> {
        measure(&self.timings, "find_by_attribute", || {
            self.inner.find_by_attribute(attribute, value)
        })
    }

    fn delete(&mut self, predicate: &Predicate) -> Result<BatchOutcome> {
        let inner = &mut self.inner;
        measure(&self.timings, "delete", || inner.delete(predicate))
    }

    fn purge(&mut self) -> Result<()> {
        let inner = &mut self.inner;
        measure(&self.timings, "purge", || inner.purge())
    }

    fn insert_with_id(&mut self, record: Record) -> Result<()> {
        let inner = &mut self.inner;
        measure(&self.timings, "insert_with_id", || inner.insert_with_id(record))
    }

    fn update(
        &mut self,
        predicates: &[Predicate],
        edits: &[Assignment],
    ) -> Result<UpdateIter<'_>> {
        let inner = &mut self.inner;
        measure(&self.timings, "update", || inner.update(predicates, edits))
    }

    fn restore(&mut self, records: Vec<Record>) -> Result<RestoreSummary> {
        let inner = &mut self.inner;
        measure(&self.timings, "restore", || inner.restore(records))
    }

    fn stats(&self) -> Stats {
        measure(&self.timings, "stats", || self.inner.stats())
    }
}
