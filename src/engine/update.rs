//! Predicate-driven update.

use std::vec;

use crate::error::{Result, RosterError};
use crate::record::codec;
use crate::record::{Assignment, Predicate};

use super::Engine;

impl Engine {
    /// Apply `edits` to every live record matching all `predicates`
    ///
    /// Returns a lazy cursor: each `next()` rewrites one matching slot in
    /// place and yields its identifier. Candidates are resolved up front;
    /// dropping the cursor early leaves the remaining matches untouched.
    ///
    /// An empty predicate list matches every live record. A failure on one
    /// record (validation, field overflow) is yielded as an `Err` item and
    /// the cursor moves on; an I/O or corruption failure ends it.
    pub fn update(
        &mut self,
        predicates: &[Predicate],
        edits: &[Assignment],
    ) -> Result<Updates<'_>> {
        // Assignment::set already refuses id edits; checked again for
        // values built through other paths.
        if edits.iter().any(|e| e.attribute() == crate::record::Attribute::Id) {
            return Err(RosterError::ImmutableId);
        }

        // Narrowest indexed predicate drives the candidate set
        let candidates: Vec<u64> = match predicates
            .iter()
            .map(|p| self.index.lookup(p.value()))
            .min_by_key(|offsets| offsets.len())
        {
            Some(offsets) => offsets.into_iter().collect(),
            None => self.live_offsets()?,
        };

        tracing::debug!(
            "Update over {} candidate slots with {} edits",
            candidates.len(),
            edits.len()
        );

        Ok(Updates {
            engine: self,
            candidates: candidates.into_iter(),
            predicates: predicates.to_vec(),
            edits: edits.to_vec(),
            failed: false,
        })
    }
}

/// Lazy update cursor returned by [`Engine::update`]
pub struct Updates<'a> {
    engine: &'a mut Engine,
    candidates: vec::IntoIter<u64>,
    predicates: Vec<Predicate>,
    edits: Vec<Assignment>,
    /// Set after a structural failure
    failed: bool,
}

impl<'a> Updates<'a> {
    /// Update one candidate slot. `Ok(None)` means it did not match.
    fn apply(&mut self, offset: u64) -> Result<Option<i32>> {
        let slot = self.engine.file.read_slot(offset)?;
        let (record, tombstoned) = codec::decode(&slot)?;

        if tombstoned || !record.matches_all(&self.predicates) {
            return Ok(None);
        }

        let mut edited = record.clone();
        for edit in &self.edits {
            edited.apply(edit)?;
        }
        self.engine.validator.validate(&edited)?;

        self.engine.rewrite(offset, &record, &edited)?;

        tracing::debug!("Updated record {} at offset {}", record.id, offset);
        Ok(Some(record.id))
    }
}

impl<'a> Iterator for Updates<'a> {
    type Item = Result<i32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while let Some(offset) = self.candidates.next() {
            match self.apply(offset) {
                Ok(Some(id)) => return Some(Ok(id)),
                Ok(None) => continue,
                Err(e @ (RosterError::Io(_) | RosterError::CorruptStore(_))) => {
                    self.failed = true;
                    return Some(Err(e));
                }
                Err(e) => {
                    tracing::warn!("Update skipped slot at offset {}: {}", offset, e);
                    return Some(Err(e));
                }
            }
        }

        None
    }
}
