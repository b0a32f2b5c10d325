//! Tests for attributes, values, predicates and edits
//!
//! These tests verify:
//! - Attribute name parsing (including aliases)
//! - Typed value parsing for every attribute
//! - Salary fixed-point parsing and formatting
//! - Predicate / Assignment construction rules

use chrono::NaiveDate;
use rosterdb::{
    Assignment, Attribute, AttributeValue, Predicate, Rank, Record, RosterError, Salary,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_record() -> Record {
    Record::new(
        3,
        "Carol",
        "Diaz",
        NaiveDate::from_ymd_opt(1990, 6, 1).unwrap(),
        4,
        Salary::from_units(270),
        Rank::C,
    )
}

// =============================================================================
// Attribute Parsing Tests
// =============================================================================

#[test]
fn test_parse_canonical_names() {
    for attribute in Attribute::ALL {
        let parsed: Attribute = attribute.name().parse().unwrap();
        assert_eq!(parsed, attribute);
    }
}

#[test]
fn test_parse_aliases() {
    assert_eq!("first_name".parse::<Attribute>().unwrap(), Attribute::FirstName);
    assert_eq!("LastName".parse::<Attribute>().unwrap(), Attribute::LastName);
    assert_eq!("dob".parse::<Attribute>().unwrap(), Attribute::BirthDate);
    assert_eq!(
        "date-of-birth".parse::<Attribute>().unwrap(),
        Attribute::BirthDate
    );
    assert_eq!(
        "job_experience".parse::<Attribute>().unwrap(),
        Attribute::Experience
    );
}

#[test]
fn test_unknown_attribute() {
    let result = "shoe_size".parse::<Attribute>();

    assert!(matches!(result, Err(RosterError::InvalidAttribute(_))));
}

// =============================================================================
// Value Parsing Tests
// =============================================================================

#[test]
fn test_parse_values() {
    assert_eq!(
        AttributeValue::parse(Attribute::Id, "17").unwrap(),
        AttributeValue::Id(17)
    );
    assert_eq!(
        AttributeValue::parse(Attribute::FirstName, " Carol ").unwrap(),
        AttributeValue::FirstName("Carol".to_string())
    );
    assert_eq!(
        AttributeValue::parse(Attribute::BirthDate, "1990-06-01").unwrap(),
        AttributeValue::BirthDate(NaiveDate::from_ymd_opt(1990, 6, 1).unwrap())
    );
    assert_eq!(
        AttributeValue::parse(Attribute::Experience, "4").unwrap(),
        AttributeValue::Experience(4)
    );
    assert_eq!(
        AttributeValue::parse(Attribute::Salary, "270").unwrap(),
        AttributeValue::Salary(Salary::from_units(270))
    );
    assert_eq!(
        AttributeValue::parse(Attribute::Rank, "c").unwrap(),
        AttributeValue::Rank(Rank::C)
    );
}

#[test]
fn test_parse_invalid_values() {
    let cases = [
        (Attribute::Id, "seven"),
        (Attribute::BirthDate, "1990/06/01"),
        (Attribute::Experience, "99999"),
        (Attribute::Salary, "12.345"),
        (Attribute::Rank, "Q"),
        (Attribute::Rank, "AB"),
    ];

    for (attribute, text) in cases {
        let result = AttributeValue::parse(attribute, text);
        assert!(
            matches!(result, Err(RosterError::InvalidAttribute(_))),
            "{} '{}' should be rejected",
            attribute,
            text
        );
    }
}

// =============================================================================
// Salary Tests
// =============================================================================

#[test]
fn test_salary_parse() {
    assert_eq!("270".parse::<Salary>().unwrap().cents(), 27_000);
    assert_eq!("270.5".parse::<Salary>().unwrap().cents(), 27_050);
    assert_eq!("270.05".parse::<Salary>().unwrap().cents(), 27_005);
    assert_eq!("-3.25".parse::<Salary>().unwrap().cents(), -325);

    assert!("".parse::<Salary>().is_err());
    assert!(".5".parse::<Salary>().is_err());
    assert!("1e3".parse::<Salary>().is_err());
}

#[test]
fn test_salary_display() {
    assert_eq!(Salary::from_cents(27_005).to_string(), "270.05");
    assert_eq!(Salary::from_units(250).to_string(), "250.00");
    assert_eq!(Salary::from_cents(-325).to_string(), "-3.25");
    assert_eq!(Salary::from_cents(-5).to_string(), "-0.05");
}

// =============================================================================
// Predicate / Assignment Tests
// =============================================================================

#[test]
fn test_predicate_rejects_mismatched_value() {
    let result = Predicate::new(Attribute::Salary, AttributeValue::Rank(Rank::A));

    assert!(matches!(result, Err(RosterError::InvalidAttribute(_))));
}

#[test]
fn test_predicate_matches_record() {
    let record = sample_record();

    let hit = Predicate::parse("salary", "270.00").unwrap();
    let miss = Predicate::parse("lastname", "Smith").unwrap();

    assert!(record.matches(&hit));
    assert!(!record.matches(&miss));
    assert!(record.matches_all(&[]));
    assert!(!record.matches_all(&[hit, miss]));
}

#[test]
fn test_assignment_on_id_is_immutable() {
    assert!(matches!(
        Assignment::parse("id", "9"),
        Err(RosterError::ImmutableId)
    ));
    assert!(matches!(
        Assignment::set(AttributeValue::Id(9)),
        Err(RosterError::ImmutableId)
    ));
    assert!(matches!(
        Assignment::new(Attribute::Id, AttributeValue::Id(9)),
        Err(RosterError::ImmutableId)
    ));
}

#[test]
fn test_apply_edits() {
    let mut record = sample_record();

    record
        .apply(&Assignment::parse("firstname", "Xena").unwrap())
        .unwrap();
    record.apply(&Assignment::parse("rank", "A").unwrap()).unwrap();

    assert_eq!(record.first_name, "Xena");
    assert_eq!(record.rank, Rank::A);
    assert_eq!(record.id, 3);
    assert_eq!(record.last_name, "Diaz");
}

#[test]
fn test_get_covers_every_attribute() {
    let record = sample_record();

    for attribute in Attribute::ALL {
        let value = record.get(attribute);
        assert_eq!(value.attribute(), attribute);
        assert!(record.matches(&Predicate::new(attribute, value).unwrap()));
    }
}
