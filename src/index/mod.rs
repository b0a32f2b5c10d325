//! Index Module
//!
//! In-memory secondary indexes over slot offsets.
//!
//! ## Responsibilities
//! - One map per attribute: value → set of slot offsets
//! - `add` / `remove` touch all seven maps together
//! - Fully rebuildable from the file (`clear` + `add` per live record)
//!
//! The file stays the source of truth. A deleted slot keeps its entries until
//! the next purge, so every lookup is re-checked against the slot it names.

mod attribute_index;

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::record::{AttributeValue, Rank, Record, Salary};

pub use attribute_index::AttributeIndex;

/// The seven per-attribute indexes of a store
#[derive(Debug, Clone, Default)]
pub struct IndexSet {
    by_id: AttributeIndex<i32>,
    by_first_name: AttributeIndex<String>,
    by_last_name: AttributeIndex<String>,
    by_birth_date: AttributeIndex<NaiveDate>,
    by_experience: AttributeIndex<i16>,
    by_salary: AttributeIndex<Salary>,
    by_rank: AttributeIndex<Rank>,
}

impl IndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every attribute of `record` at `offset`
    pub fn add(&mut self, record: &Record, offset: u64) {
        // Destructure so a new field cannot be left out silently
        let Record {
            id,
            first_name,
            last_name,
            birth_date,
            experience,
            salary,
            rank,
        } = record;

        self.by_id.insert(*id, offset);
        self.by_first_name.insert(first_name.clone(), offset);
        self.by_last_name.insert(last_name.clone(), offset);
        self.by_birth_date.insert(*birth_date, offset);
        self.by_experience.insert(*experience, offset);
        self.by_salary.insert(*salary, offset);
        self.by_rank.insert(*rank, offset);
    }

    /// Drop every attribute of `record` at `offset`
    pub fn remove(&mut self, record: &Record, offset: u64) {
        let Record {
            id,
            first_name,
            last_name,
            birth_date,
            experience,
            salary,
            rank,
        } = record;

        self.by_id.remove(id, offset);
        self.by_first_name.remove(first_name, offset);
        self.by_last_name.remove(last_name, offset);
        self.by_birth_date.remove(birth_date, offset);
        self.by_experience.remove(experience, offset);
        self.by_salary.remove(salary, offset);
        self.by_rank.remove(rank, offset);
    }

    /// Candidate offsets for an attribute value (empty set if unknown)
    pub fn lookup(&self, value: &AttributeValue) -> BTreeSet<u64> {
        match value {
            AttributeValue::Id(v) => self.by_id.get(v),
            AttributeValue::FirstName(v) => self.by_first_name.get(v),
            AttributeValue::LastName(v) => self.by_last_name.get(v),
            AttributeValue::BirthDate(v) => self.by_birth_date.get(v),
            AttributeValue::Experience(v) => self.by_experience.get(v),
            AttributeValue::Salary(v) => self.by_salary.get(v),
            AttributeValue::Rank(v) => self.by_rank.get(v),
        }
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_first_name.clear();
        self.by_last_name.clear();
        self.by_birth_date.clear();
        self.by_experience.clear();
        self.by_salary.clear();
        self.by_rank.clear();
    }

    /// Number of distinct identifiers indexed
    pub fn id_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
