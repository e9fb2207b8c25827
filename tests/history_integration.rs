//! Integration tests for the calculation history.
//!
//! These tests drive the store, the session and the projection engine
//! against a real history file in a temporary directory.

use chrono::{DateTime, Duration, TimeZone, Utc};
use joule_calc::commands::{HistorySession, SaveOutcome};
use joule_calc::history::{
    flatten_sorted, project, CalculationRecord, HistoryError, HistoryStore, JsonFileStorage,
    SortMode, ViewMode, ViewState, MAX_HISTORY_ITEMS,
};
use joule_calc::units::UnitSystem;
use std::fs;
use tempfile::TempDir;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
}

fn record(weight: f64, velocity: f64, minutes: i64) -> CalculationRecord {
    CalculationRecord::at(
        weight,
        velocity,
        UnitSystem::Metric,
        base_time() + Duration::minutes(minutes),
    )
    .unwrap()
}

fn file_store(dir: &TempDir) -> HistoryStore<JsonFileStorage> {
    HistoryStore::new(JsonFileStorage::new(dir.path().join("history.json")))
}

#[test]
fn test_two_records_round_trip_through_file() {
    let dir = TempDir::new().unwrap();
    let mut store = file_store(&dir);

    store.add(record(0.20, 100.0, 0)).unwrap();
    store.add(record(0.25, 90.0, 1)).unwrap();

    assert!((store.records()[1].joule() - 1.0).abs() < 1e-9);
    assert!((store.records()[0].joule() - 1.0125).abs() < 1e-9);

    let flat = flatten_sorted(store.records(), &ViewState::default());
    let keys: Vec<String> = flat.iter().map(|r| r.group_key()).collect();
    assert_eq!(keys, vec!["0.25", "0.20"]);

    let mut reloaded = file_store(&dir);
    assert_eq!(reloaded.load().unwrap(), 2);
    assert_eq!(reloaded.records(), store.records());
}

#[test]
fn test_persisted_json_is_a_camel_case_array() {
    let dir = TempDir::new().unwrap();
    let mut store = file_store(&dir);
    store.add(record(0.20, 100.0, 0)).unwrap();

    let raw = fs::read_to_string(dir.path().join("history.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value.as_array().unwrap()[0];

    assert!(entry.get("weightOriginal").is_some());
    assert!(entry.get("velocityOriginal").is_some());
    assert!(entry.get("unitLabel").is_some());
    let timestamp = entry["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[test]
fn test_fifty_first_record_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut store = file_store(&dir);

    for i in 0..MAX_HISTORY_ITEMS {
        store.add(record(0.20, 80.0 + i as f64, i as i64)).unwrap();
    }

    let result = store.add(record(0.25, 90.0, 100));
    assert!(matches!(
        result,
        Err(HistoryError::CapacityExceeded { current: 50, max: 50 })
    ));
    assert_eq!(store.len(), MAX_HISTORY_ITEMS);

    let mut reloaded = file_store(&dir);
    assert_eq!(reloaded.load().unwrap(), MAX_HISTORY_ITEMS);
}

#[test]
fn test_remove_group_respects_rounded_keys() {
    let dir = TempDir::new().unwrap();
    let mut store = file_store(&dir);

    store.add(record(0.196, 100.0, 0)).unwrap();
    store.add(record(0.204, 100.0, 1)).unwrap();
    store.add(record(0.246, 90.0, 2)).unwrap();
    store.add(record(0.25, 95.0, 3)).unwrap();
    store.add(record(0.206, 100.0, 4)).unwrap();

    assert_eq!(store.remove_group("0.20").unwrap(), 2);

    let keys: Vec<String> = store.records().iter().map(|r| r.group_key()).collect();
    assert_eq!(keys, vec!["0.21", "0.25", "0.25"]);

    let mut reloaded = file_store(&dir);
    reloaded.load().unwrap();
    assert_eq!(reloaded.len(), 3);
}

#[test]
fn test_sort_change_reorders_only_its_group() {
    let dir = TempDir::new().unwrap();
    let mut store = file_store(&dir);

    store.add(record(0.25, 90.0, 0)).unwrap();
    store.add(record(0.25, 85.0, 1)).unwrap();
    store.add(record(0.20, 120.0, 2)).unwrap();
    store.add(record(0.20, 100.0, 3)).unwrap();
    store.add(record(0.20, 110.0, 4)).unwrap();

    let mut view = ViewState::new(2);
    view.load_more();
    let before = flatten_sorted(store.records(), &view);

    view.set_sort_mode("0.20", SortMode::EnergyAsc);
    assert_eq!(view.visible_count(), 2);

    let after = flatten_sorted(store.records(), &view);
    let velocities: Vec<f64> = after.iter().map(|r| r.velocity()).collect();
    assert_eq!(velocities, vec![100.0, 110.0, 120.0, 85.0, 90.0]);

    // The other group keeps its relative order
    assert_eq!(&before[3..], &after[3..]);

    let projection = project(store.records(), &view, ViewMode::Paginated);
    assert_eq!(projection.groups().len(), 1);
    assert_eq!(projection.groups()[0].records.len(), 2);
    let load_more = projection.load_more().unwrap();
    assert_eq!(load_more.remaining, 3);
    assert_eq!(load_more.next_batch, 2);
}

#[test]
fn test_load_skips_corrupt_records_and_truncates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");

    let mut entries: Vec<serde_json::Value> = (0..MAX_HISTORY_ITEMS + 5)
        .map(|i| serde_json::to_value(record(0.20, 80.0 + i as f64, i as i64)).unwrap())
        .collect();
    entries.insert(3, serde_json::json!({ "id": "broken" }));
    fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();

    let mut store = HistoryStore::new(JsonFileStorage::new(&path));
    assert_eq!(store.load().unwrap(), MAX_HISTORY_ITEMS);
    assert_eq!(store.records()[0].velocity(), 80.0);
    assert!(store.records().iter().all(|r| r.id() != "broken"));
}

#[test]
fn test_non_array_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, r#"{ "records": [] }"#).unwrap();

    let mut store = HistoryStore::new(JsonFileStorage::new(&path));
    let err = store.load().unwrap_err();
    assert!(err.is_persistence_failure());
    assert!(store.is_empty());
}

#[test]
fn test_session_flow_against_file() {
    let dir = TempDir::new().unwrap();
    let mut session = HistorySession::new(file_store(&dir), ViewState::new(2));

    for velocity in [90.0, 95.0, 100.0] {
        let result = session
            .calculate_and_save(0.25, velocity, UnitSystem::Metric)
            .unwrap();
        assert!(matches!(result.outcome, SaveOutcome::Saved { .. }));
    }
    session.load_more();
    assert_eq!(session.projection(ViewMode::Paginated).groups()[0].records.len(), 3);

    let id = session.records()[0].id().to_string();
    assert!(session.remove(&id).unwrap());
    assert_eq!(session.view().visible_count(), 3);

    session.clear().unwrap();
    assert!(session.projection(ViewMode::Paginated).is_empty());

    let mut reloaded = file_store(&dir);
    assert_eq!(reloaded.load().unwrap(), 0);
}
