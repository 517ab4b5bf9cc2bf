use super::*;

use mirador_core::sample_config;
use tempfile::TempDir;

fn store() -> (TempDir, ConfigStore) {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("bi")).unwrap();
    (dir, store)
}

#[test]
fn load_without_config_returns_none() {
    let (_dir, store) = store();
    assert!(!store.config_exists());
    assert!(store.load().unwrap().is_none());
}

#[test]
fn save_then_load_round_trips() {
    let (_dir, store) = store();
    let config = sample_config();

    store.save(&config).unwrap();
    assert!(store.config_exists());

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn counter_round_trips() {
    let (_dir, store) = store();
    assert_eq!(store.load_num_enabled_aggregations(), 0);

    store.save_num_enabled_aggregations(7).unwrap();
    assert_eq!(store.load_num_enabled_aggregations(), 7);
}

#[test]
fn garbage_counter_reads_as_zero() {
    let (_dir, store) = store();
    std::fs::write(store.base_dir().join("num_enabled_aggregations"), "wat").unwrap();
    assert_eq!(store.load_num_enabled_aggregations(), 0);
}

#[test]
fn corrupt_config_is_a_json_error() {
    let (_dir, store) = store();
    std::fs::write(store.base_dir().join("bi_config.json"), "{not json").unwrap();
    assert!(matches!(store.load(), Err(StoreError::Json(_))));
}
