//! Tests for Engine::purge
//!
//! These tests verify:
//! - Deleted slots are reclaimed and counters reset
//! - Purge is idempotent
//! - Indexes only point at survivors afterwards
//! - The store survives a reopen after purge

use chrono::NaiveDate;
use rosterdb::record::SLOT_SIZE;
use rosterdb::{
    Attribute, AttributeValue, Config, Engine, Predicate, Rank, Record, Salary, Stats,
    SyncStrategy,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn config_for(temp_dir: &TempDir) -> Config {
    Config::builder()
        .data_path(temp_dir.path().join("roster.db"))
        .sync_strategy(SyncStrategy::OsBuffered)
        .build()
}

fn person(id: i32, first: &str, salary: i64) -> Record {
    Record::new(
        id,
        first,
        "Stone",
        NaiveDate::from_ymd_opt(1990, 7, 1).unwrap(),
        3,
        Salary::from_units(salary),
        Rank::C,
    )
}

/// Five records, the one earning 270 deleted
fn setup_with_deletion() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = Engine::open(config_for(&temp_dir)).unwrap();
    for (i, name) in ["Ann", "Ben", "Cid", "Dee", "Eli"].iter().enumerate() {
        engine
            .create(person(i as i32 + 1, name, 250 + 10 * i as i64))
            .unwrap();
    }
    engine
        .delete(&Predicate::from(AttributeValue::Salary(Salary::from_units(270))))
        .unwrap();
    (temp_dir, engine)
}

fn live_ids(engine: &Engine) -> Vec<i32> {
    engine.read_all().unwrap().map(|r| r.unwrap().id).collect()
}

// =============================================================================
// Purge Tests
// =============================================================================

#[test]
fn test_purge_reclaims_deleted_slots() {
    let (_temp, mut engine) = setup_with_deletion();
    assert_eq!(engine.file_len(), 5 * SLOT_SIZE as u64);

    engine.purge().unwrap();

    assert_eq!(engine.stats(), Stats::new(4, 0));
    assert_eq!(engine.file_len(), 4 * SLOT_SIZE as u64);
    assert_eq!(live_ids(&engine), vec![1, 2, 4, 5]);
}

#[test]
fn test_purge_is_idempotent() {
    let (_temp, mut engine) = setup_with_deletion();

    engine.purge().unwrap();
    let once = live_ids(&engine);
    let len_once = engine.file_len();

    engine.purge().unwrap();

    assert_eq!(live_ids(&engine), once);
    assert_eq!(engine.file_len(), len_once);
    assert_eq!(engine.stats(), Stats::new(4, 0));
}

#[test]
fn test_purge_empty_store() {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = Engine::open(config_for(&temp_dir)).unwrap();

    engine.purge().unwrap();

    assert_eq!(engine.stats(), Stats::new(0, 0));
    assert_eq!(engine.file_len(), 0);
}

#[test]
fn test_purge_drops_deleted_from_every_index() {
    let (_temp, mut engine) = setup_with_deletion();
    let deleted = person(3, "Cid", 270);

    engine.purge().unwrap();

    for attribute in Attribute::ALL {
        let value = deleted.get(attribute);
        let offsets = engine.index().lookup(&value);
        for offset in offsets {
            assert!(offset < engine.file_len());
        }
        let found = engine.find_by_attribute(attribute, &value).unwrap();
        assert!(found.iter().all(|r| r.id != 3));
    }
    assert_eq!(engine.index().id_count(), 4);
    assert!(engine.index().lookup(&AttributeValue::Id(3)).is_empty());
}

#[test]
fn test_purge_keeps_survivors_findable() {
    let (_temp, mut engine) = setup_with_deletion();

    engine.purge().unwrap();

    let found = engine
        .find_by_attribute(Attribute::FirstName, &AttributeValue::FirstName("Dee".into()))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 4);
}

#[test]
fn test_purge_leaves_no_compaction_file() {
    let (temp, mut engine) = setup_with_deletion();

    engine.purge().unwrap();

    assert!(!config_for(&temp).compact_path().exists());
    assert!(config_for(&temp).data_path.exists());
}

#[test]
fn test_purge_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut engine = Engine::open(config_for(&temp_dir)).unwrap();
        for (i, name) in ["Ann", "Ben", "Cid"].iter().enumerate() {
            engine.create(person(i as i32 + 1, name, 100)).unwrap();
        }
        engine
            .delete(&Predicate::from(AttributeValue::Id(2)))
            .unwrap();
        engine.purge().unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(config_for(&temp_dir)).unwrap();

    assert_eq!(engine.stats(), Stats::new(2, 0));
    assert_eq!(live_ids(&engine), vec![1, 3]);
    assert_eq!(engine.next_id(), 4);
}

#[test]
fn test_delete_after_purge_uses_new_offsets() {
    let (_temp, mut engine) = setup_with_deletion();
    engine.purge().unwrap();

    let outcomes = engine
        .delete(&Predicate::from(AttributeValue::Id(5)))
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(*outcomes[0].as_ref().unwrap(), 5);
    assert_eq!(live_ids(&engine), vec![1, 2, 4]);
    assert_eq!(engine.stats(), Stats::new(3, 1));
}
