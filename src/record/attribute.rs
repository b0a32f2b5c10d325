//! Attribute names, typed attribute values, predicates and edits.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

use super::{Rank, Salary};

/// The seven indexed attributes of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Id,
    FirstName,
    LastName,
    BirthDate,
    Experience,
    Salary,
    Rank,
}

impl Attribute {
    pub const ALL: [Attribute; 7] = [
        Attribute::Id,
        Attribute::FirstName,
        Attribute::LastName,
        Attribute::BirthDate,
        Attribute::Experience,
        Attribute::Salary,
        Attribute::Rank,
    ];

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Id => "id",
            Attribute::FirstName => "firstname",
            Attribute::LastName => "lastname",
            Attribute::BirthDate => "birthdate",
            Attribute::Experience => "experience",
            Attribute::Salary => "salary",
            Attribute::Rank => "rank",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "id" => Ok(Attribute::Id),
            "firstname" => Ok(Attribute::FirstName),
            "lastname" => Ok(Attribute::LastName),
            "birthdate" | "dateofbirth" | "dob" => Ok(Attribute::BirthDate),
            "experience" | "jobexperience" => Ok(Attribute::Experience),
            "salary" => Ok(Attribute::Salary),
            "rank" => Ok(Attribute::Rank),
            _ => Err(RosterError::InvalidAttribute(format!(
                "unknown attribute '{}'",
                s
            ))),
        }
    }
}

/// A typed value of one attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    Id(i32),
    FirstName(String),
    LastName(String),
    BirthDate(NaiveDate),
    Experience(i16),
    Salary(Salary),
    Rank(Rank),
}

impl AttributeValue {
    /// The attribute this value belongs to
    pub fn attribute(&self) -> Attribute {
        match self {
            AttributeValue::Id(_) => Attribute::Id,
            AttributeValue::FirstName(_) => Attribute::FirstName,
            AttributeValue::LastName(_) => Attribute::LastName,
            AttributeValue::BirthDate(_) => Attribute::BirthDate,
            AttributeValue::Experience(_) => Attribute::Experience,
            AttributeValue::Salary(_) => Attribute::Salary,
            AttributeValue::Rank(_) => Attribute::Rank,
        }
    }

    /// Parse text into a value of the given attribute
    ///
    /// Dates use `YYYY-MM-DD`; salaries accept up to two decimals.
    pub fn parse(attribute: Attribute, text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = |what: &str| {
            RosterError::InvalidAttribute(format!("'{}' is not a valid {}", text, what))
        };

        Ok(match attribute {
            Attribute::Id => AttributeValue::Id(text.parse().map_err(|_| invalid("id"))?),
            Attribute::FirstName => AttributeValue::FirstName(text.to_string()),
            Attribute::LastName => AttributeValue::LastName(text.to_string()),
            Attribute::BirthDate => AttributeValue::BirthDate(
                NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid("date"))?,
            ),
            Attribute::Experience => {
                AttributeValue::Experience(text.parse().map_err(|_| invalid("experience"))?)
            }
            Attribute::Salary => AttributeValue::Salary(text.parse()?),
            Attribute::Rank => AttributeValue::Rank(text.parse()?),
        })
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Id(v) => write!(f, "{}", v),
            AttributeValue::FirstName(v) | AttributeValue::LastName(v) => f.write_str(v),
            AttributeValue::BirthDate(v) => write!(f, "{}", v),
            AttributeValue::Experience(v) => write!(f, "{}", v),
            AttributeValue::Salary(v) => write!(f, "{}", v),
            AttributeValue::Rank(v) => write!(f, "{}", v),
        }
    }
}

fn checked(attribute: Attribute, value: AttributeValue) -> Result<AttributeValue> {
    if value.attribute() != attribute {
        return Err(RosterError::InvalidAttribute(format!(
            "value '{}' belongs to '{}', not '{}'",
            value,
            value.attribute(),
            attribute
        )));
    }
    Ok(value)
}

// =============================================================================
// Predicate (`where attribute = value`)
// =============================================================================

/// Equality test against one attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    value: AttributeValue,
}

impl Predicate {
    /// Build a predicate; the value must belong to `attribute`
    pub fn new(attribute: Attribute, value: AttributeValue) -> Result<Self> {
        Ok(Self {
            value: checked(attribute, value)?,
        })
    }

    /// Parse `attribute` and `value` from text
    pub fn parse(attribute: &str, value: &str) -> Result<Self> {
        let attribute: Attribute = attribute.parse()?;
        Ok(Self {
            value: AttributeValue::parse(attribute, value)?,
        })
    }

    pub fn attribute(&self) -> Attribute {
        self.value.attribute()
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }
}

impl From<AttributeValue> for Predicate {
    fn from(value: AttributeValue) -> Self {
        Self { value }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute(), self.value)
    }
}

// =============================================================================
// Assignment (`set attribute = value`)
// =============================================================================

/// A single field edit applied by `update`. Never targets the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    value: AttributeValue,
}

impl Assignment {
    pub fn new(attribute: Attribute, value: AttributeValue) -> Result<Self> {
        Self::set(checked(attribute, value)?)
    }

    /// Build an edit from a value; identifier edits are rejected
    pub fn set(value: AttributeValue) -> Result<Self> {
        if value.attribute() == Attribute::Id {
            return Err(RosterError::ImmutableId);
        }
        Ok(Self { value })
    }

    pub fn parse(attribute: &str, value: &str) -> Result<Self> {
        let attribute: Attribute = attribute.parse()?;
        if attribute == Attribute::Id {
            return Err(RosterError::ImmutableId);
        }
        Self::set(AttributeValue::parse(attribute, value)?)
    }

    pub fn attribute(&self) -> Attribute {
        self.value.attribute()
    }

    pub fn value(&self) -> &AttributeValue {
        &self.value
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute(), self.value)
    }
}
