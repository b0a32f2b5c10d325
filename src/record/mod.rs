//! Record Module
//!
//! The fixed-schema personnel record and its on-disk slot encoding.
//!
//! ## Responsibilities
//! - Logical record model (identifier, names, birth date, experience,
//!   salary, rank)
//! - Typed attribute values for lookups, `where` predicates and `set` edits
//! - Fixed-width slot codec (see [`codec`])

mod attribute;
pub mod codec;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

pub use attribute::{Assignment, Attribute, AttributeValue, Predicate};
pub use codec::{decode, encode, SLOT_SIZE};

/// A single personnel record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, unique among live records. `0` asks the engine to assign one.
    pub id: i32,

    pub first_name: String,

    pub last_name: String,

    pub birth_date: NaiveDate,

    /// Years of job experience
    pub experience: i16,

    pub salary: Salary,

    pub rank: Rank,
}

impl Record {
    pub fn new(
        id: i32,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
        experience: i16,
        salary: Salary,
        rank: Rank,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
            experience,
            salary,
            rank,
        }
    }

    /// Read one attribute as a typed value
    pub fn get(&self, attribute: Attribute) -> AttributeValue {
        match attribute {
            Attribute::Id => AttributeValue::Id(self.id),
            Attribute::FirstName => AttributeValue::FirstName(self.first_name.clone()),
            Attribute::LastName => AttributeValue::LastName(self.last_name.clone()),
            Attribute::BirthDate => AttributeValue::BirthDate(self.birth_date),
            Attribute::Experience => AttributeValue::Experience(self.experience),
            Attribute::Salary => AttributeValue::Salary(self.salary),
            Attribute::Rank => AttributeValue::Rank(self.rank),
        }
    }

    /// Whether this record satisfies an equality predicate
    pub fn matches(&self, predicate: &Predicate) -> bool {
        match predicate.value() {
            AttributeValue::Id(v) => self.id == *v,
            AttributeValue::FirstName(v) => self.first_name == *v,
            AttributeValue::LastName(v) => self.last_name == *v,
            AttributeValue::BirthDate(v) => self.birth_date == *v,
            AttributeValue::Experience(v) => self.experience == *v,
            AttributeValue::Salary(v) => self.salary == *v,
            AttributeValue::Rank(v) => self.rank == *v,
        }
    }

    /// Whether this record satisfies every predicate (empty list matches all)
    pub fn matches_all(&self, predicates: &[Predicate]) -> bool {
        predicates.iter().all(|p| self.matches(p))
    }

    /// Apply a `set` edit. Identifiers never change through an edit.
    pub fn apply(&mut self, assignment: &Assignment) -> Result<()> {
        match assignment.value().clone() {
            AttributeValue::Id(_) => return Err(RosterError::ImmutableId),
            AttributeValue::FirstName(v) => self.first_name = v,
            AttributeValue::LastName(v) => self.last_name = v,
            AttributeValue::BirthDate(v) => self.birth_date = v,
            AttributeValue::Experience(v) => self.experience = v,
            AttributeValue::Salary(v) => self.salary = v,
            AttributeValue::Rank(v) => self.rank = v,
        }
        Ok(())
    }

    /// Ensure required text fields are present
    pub(crate) fn ensure_present(&self) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(RosterError::NullRecord("first name is empty".to_string()));
        }
        if self.last_name.trim().is_empty() {
            return Err(RosterError::NullRecord("last name is empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6}  {:<16} {:<16} {}  {:>3}  {:>12}  {}",
            self.id,
            self.first_name,
            self.last_name,
            self.birth_date,
            self.experience,
            self.salary,
            self.rank
        )
    }
}

// =============================================================================
// Salary
// =============================================================================

/// Fixed-point salary stored as a whole number of cents.
///
/// Integer storage keeps equality and hashing exact, so salary index keys
/// survive an encode/decode round trip unchanged.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Salary(i64);

impl Salary {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole currency units, e.g. `Salary::from_units(270)` is 270.00
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Salary {
    type Err = RosterError;

    /// Accepts `270`, `270.5` and `270.50`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RosterError::InvalidAttribute(format!("'{}' is not a valid salary", s));

        let text = s.trim();
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (units, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if units.is_empty() || fraction.len() > 2 || !all_digits(units) || !all_digits(fraction) {
            return Err(invalid());
        }

        let units: i64 = units.parse().map_err(|_| invalid())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;

        Ok(Salary(if negative { -total } else { total }))
    }
}

// =============================================================================
// Rank
// =============================================================================

/// Grade of an employee, stored as a single ASCII character
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Rank {
    A,
    B,
    C,
    D,
    E,
}

impl Rank {
    pub const ALL: [Rank; 5] = [Rank::A, Rank::B, Rank::C, Rank::D, Rank::E];

    pub fn as_byte(self) -> u8 {
        match self {
            Rank::A => b'A',
            Rank::B => b'B',
            Rank::C => b'C',
            Rank::D => b'D',
            Rank::E => b'E',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'A' => Some(Rank::A),
            b'B' => Some(Rank::B),
            b'C' => Some(Rank::C),
            b'D' => Some(Rank::D),
            b'E' => Some(Rank::E),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

impl FromStr for Rank {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().as_bytes() {
            [byte] => Rank::from_byte(byte.to_ascii_uppercase()),
            _ => None,
        }
        .ok_or_else(|| RosterError::InvalidAttribute(format!("'{}' is not a valid rank", s)))
    }
}
