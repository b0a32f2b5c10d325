//! Tests for the slot codec
//!
//! These tests verify:
//! - Fixed slot size and field placement
//! - Tombstone flag encoding and corruption detection
//! - Text padding, trimming and capacity limits

use chrono::NaiveDate;
use rosterdb::record::codec::{self, HEADER_SIZE, NAME_CAPACITY, SLOT_SIZE, TOMBSTONE};
use rosterdb::{Rank, Record, RosterError, Salary};

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_record() -> Record {
    Record::new(
        42,
        "Alice",
        "Martin",
        NaiveDate::from_ymd_opt(1985, 3, 14).unwrap(),
        7,
        Salary::from_cents(412_550),
        Rank::B,
    )
}

// Field offsets inside a slot
const ID_AT: usize = HEADER_SIZE;
const FIRST_NAME_AT: usize = ID_AT + 4;
const BIRTH_DATE_AT: usize = FIRST_NAME_AT + 2 * NAME_CAPACITY;
const RANK_AT: usize = SLOT_SIZE - 1;

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_slot_size_is_constant() {
    assert_eq!(SLOT_SIZE, 271);

    let short = Record::new(
        1,
        "Al",
        "Li",
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        0,
        Salary::default(),
        Rank::A,
    );
    assert_eq!(codec::encode(&short).unwrap().len(), SLOT_SIZE);
    assert_eq!(codec::encode(&sample_record()).unwrap().len(), SLOT_SIZE);
}

#[test]
fn test_field_placement() {
    let slot = codec::encode(&sample_record()).unwrap();

    assert_eq!(slot[0], 0); // live
    assert_eq!(&slot[1..HEADER_SIZE], &[0, 0, 0]); // header padding
    assert_eq!(&slot[ID_AT..ID_AT + 4], &42i32.to_le_bytes());
    assert_eq!(&slot[FIRST_NAME_AT..FIRST_NAME_AT + 5], b"Alice");
    assert!(slot[FIRST_NAME_AT + 5..FIRST_NAME_AT + NAME_CAPACITY]
        .iter()
        .all(|&b| b == 0));
    assert_eq!(&slot[BIRTH_DATE_AT..BIRTH_DATE_AT + 4], &1985i32.to_le_bytes());
    assert_eq!(slot[RANK_AT], b'B');
}

#[test]
fn test_decode_returns_encoded_record() {
    let record = sample_record();
    let slot = codec::encode(&record).unwrap();

    let (decoded, tombstoned) = codec::decode(&slot).unwrap();

    assert_eq!(decoded, record);
    assert!(!tombstoned);
}

// =============================================================================
// Tombstone Tests
// =============================================================================

#[test]
fn test_encode_tombstoned_slot() {
    let slot = codec::encode_slot(&sample_record(), true).unwrap();

    assert_eq!(slot[0], TOMBSTONE);
    let (_, tombstoned) = codec::decode(&slot).unwrap();
    assert!(tombstoned);
}

#[test]
fn test_mark_tombstoned_in_place() {
    let mut slot = codec::encode(&sample_record()).unwrap().to_vec();

    codec::mark_tombstoned(&mut slot);

    assert!(codec::is_tombstoned(&slot).unwrap());
    let (record, tombstoned) = codec::decode(&slot).unwrap();
    assert!(tombstoned);
    assert_eq!(record, sample_record());
}

#[test]
fn test_unknown_tombstone_byte_is_corruption() {
    let mut slot = codec::encode(&sample_record()).unwrap().to_vec();
    slot[0] = 7;

    let result = codec::decode(&slot);

    assert!(matches!(result, Err(RosterError::CorruptStore(_))));
    assert!(matches!(
        codec::is_tombstoned(&slot),
        Err(RosterError::CorruptStore(_))
    ));
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_wrong_slot_length_is_corruption() {
    let slot = codec::encode(&sample_record()).unwrap();

    let result = codec::decode(&slot[..SLOT_SIZE - 1]);

    assert!(matches!(result, Err(RosterError::CorruptStore(_))));
}

#[test]
fn test_invalid_rank_byte_is_corruption() {
    let mut slot = codec::encode(&sample_record()).unwrap().to_vec();
    slot[RANK_AT] = b'Z';

    assert!(matches!(
        codec::decode(&slot),
        Err(RosterError::CorruptStore(_))
    ));
}

#[test]
fn test_lowercase_rank_byte_is_corruption() {
    let mut slot = codec::encode(&sample_record()).unwrap().to_vec();
    slot[RANK_AT] = b'b';

    assert!(matches!(
        codec::decode(&slot),
        Err(RosterError::CorruptStore(_))
    ));
}

#[test]
fn test_invalid_birth_date_is_corruption() {
    let mut slot = codec::encode(&sample_record()).unwrap().to_vec();
    let month_at = BIRTH_DATE_AT + 4;
    slot[month_at..month_at + 4].copy_from_slice(&13i32.to_le_bytes());

    assert!(matches!(
        codec::decode(&slot),
        Err(RosterError::CorruptStore(_))
    ));
}

// =============================================================================
// Text Field Tests
// =============================================================================

#[test]
fn test_name_at_capacity_fits() {
    let mut record = sample_record();
    record.last_name = "x".repeat(NAME_CAPACITY);

    let slot = codec::encode(&record).unwrap();
    let (decoded, _) = codec::decode(&slot).unwrap();

    assert_eq!(decoded.last_name.len(), NAME_CAPACITY);
}

#[test]
fn test_name_over_capacity_fails() {
    let mut record = sample_record();
    record.first_name = "x".repeat(NAME_CAPACITY + 1);

    let result = codec::encode(&record);

    match result {
        Err(RosterError::FieldOverflow {
            field,
            len,
            capacity,
        }) => {
            assert_eq!(field, "first_name");
            assert_eq!(len, NAME_CAPACITY + 1);
            assert_eq!(capacity, NAME_CAPACITY);
        }
        other => panic!("Expected FieldOverflow, got {:?}", other),
    }
}

#[test]
fn test_trailing_control_bytes_are_trimmed_on_decode() {
    let mut slot = codec::encode(&sample_record()).unwrap().to_vec();
    // "Alice" followed by bytes a foreign writer left behind
    slot[FIRST_NAME_AT + 5] = 0x01;
    slot[FIRST_NAME_AT + 6] = 0x07;

    let (decoded, _) = codec::decode(&slot).unwrap();

    assert_eq!(decoded.first_name, "Alice");
}

#[test]
fn test_name_ending_in_control_character_is_rejected() {
    for name in ["Ann\t", "Ann\u{0}", "Ann\u{1}\u{7}", "Ann\n"] {
        let mut record = sample_record();
        record.first_name = name.to_string();

        let result = codec::encode(&record);

        assert!(
            matches!(result, Err(RosterError::InvalidAttribute(_))),
            "{:?} was accepted",
            name
        );
    }
}

#[test]
fn test_inner_control_character_survives() {
    let mut record = sample_record();
    record.last_name = "Mar\ttin".to_string();

    let slot = codec::encode(&record).unwrap();
    let (decoded, _) = codec::decode(&slot).unwrap();

    assert_eq!(decoded, record);
}

#[test]
fn test_multibyte_names_survive() {
    let mut record = sample_record();
    record.first_name = "Zoë".to_string();
    record.last_name = "Łukasiewicz".to_string();

    let slot = codec::encode(&record).unwrap();
    let (decoded, _) = codec::decode(&slot).unwrap();

    assert_eq!(decoded.first_name, "Zoë");
    assert_eq!(decoded.last_name, "Łukasiewicz");
}

#[test]
fn test_invalid_utf8_name_is_corruption() {
    let mut slot = codec::encode(&sample_record()).unwrap().to_vec();
    slot[FIRST_NAME_AT] = 0xFF;

    assert!(matches!(
        codec::decode(&slot),
        Err(RosterError::CorruptStore(_))
    ));
}
