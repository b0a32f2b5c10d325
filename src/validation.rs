//! Record validation
//!
//! Validators are injected into an engine at construction time.

use chrono::{Datelike, Local};

use crate::error::{Result, RosterError};
use crate::record::Record;

/// Checks a record before it is written
pub trait RecordValidator: Send + Sync {
    fn validate(&self, record: &Record) -> Result<()>;
}

/// Accepts every record
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl RecordValidator for AcceptAll {
    fn validate(&self, _record: &Record) -> Result<()> {
        Ok(())
    }
}

/// Default field rules for personnel records
#[derive(Debug, Clone)]
pub struct DefaultValidator {
    /// Earliest accepted birth year
    pub min_birth_year: i32,
}

impl Default for DefaultValidator {
    fn default() -> Self {
        Self {
            min_birth_year: 1900,
        }
    }
}

impl RecordValidator for DefaultValidator {
    fn validate(&self, record: &Record) -> Result<()> {
        check_name("first name", &record.first_name)?;
        check_name("last name", &record.last_name)?;

        let year = record.birth_date.year();
        let current_year = Local::now().year();
        if year < self.min_birth_year || year > current_year {
            return Err(RosterError::Validation(format!(
                "birth year {} outside {}..={}",
                year, self.min_birth_year, current_year
            )));
        }

        if record.experience < 0 {
            return Err(RosterError::Validation(format!(
                "experience {} is negative",
                record.experience
            )));
        }

        if record.salary.cents() < 0 {
            return Err(RosterError::Validation(format!(
                "salary {} is negative",
                record.salary
            )));
        }

        Ok(())
    }
}

/// Letters plus inner space, apostrophe or hyphen
fn check_name(field: &str, name: &str) -> Result<()> {
    let starts_with_letter = name.chars().next().is_some_and(char::is_alphabetic);
    let allowed = name
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '-');

    if !starts_with_letter || !allowed {
        return Err(RosterError::Validation(format!(
            "{} '{}' must be letters, spaces, apostrophes or hyphens",
            field, name
        )));
    }
    Ok(())
}
