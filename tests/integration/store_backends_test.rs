//! Integration tests for the on-disk collection stores.

use std::sync::Arc;

use logitrack::fleet::{FleetDirectory, Messenger};
use logitrack::gamification::{RuleTable, RuleUpdate};
use logitrack::routes::ClientStatsAggregator;
use logitrack::storage::{
    config, names, open_store, AppConfig, CollectionStore, Database, JsonFileStore, StorageBackend,
    StoreError,
};
use serde_json::json;
use tempfile::TempDir;

/// Writes through one handle and reads back through a fresh one.
fn survives_reopen<F>(open: F)
where
    F: Fn() -> Arc<dyn CollectionStore>,
{
    let messenger = Messenger::new("Pedro", "Guzmán");
    {
        let store = open();
        FleetDirectory::new(Arc::clone(&store))
            .upsert_messenger(&messenger)
            .unwrap();
        RuleTable::new(Arc::clone(&store))
            .update_rule(
                "rule-volume",
                RuleUpdate {
                    points_awarded: Some(15),
                    ..Default::default()
                },
            )
            .unwrap();
        ClientStatsAggregator::new(store)
            .update_client_route_stats("c1", 18.0)
            .unwrap();
    }

    let store = open();
    let fleet = FleetDirectory::new(Arc::clone(&store));
    assert_eq!(
        fleet.messenger(&messenger.id).unwrap().unwrap().full_name(),
        "Pedro Guzmán"
    );

    let rules = RuleTable::new(Arc::clone(&store)).get_rules().unwrap();
    assert_eq!(rules.len(), 9);
    let volume = rules.iter().find(|r| r.id == "rule-volume").unwrap();
    assert_eq!(volume.points_awarded, 15);

    let stats = ClientStatsAggregator::new(store)
        .client_route_stats("c1")
        .unwrap()
        .unwrap();
    assert_eq!(stats.average_duration, 18.0);
    assert_eq!(stats.client_name, "Unknown");
}

#[test]
fn test_json_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    survives_reopen(|| Arc::new(JsonFileStore::open(&path).unwrap()));

    // The document keeps the camelCase collection names.
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw.get("gamificationRules").is_some());
    assert!(raw.get("clientRouteStats").is_some());
}

#[test]
fn test_sqlite_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logitrack.db");
    survives_reopen(|| Arc::new(Database::open(&path).unwrap()));

    let db = Database::open(&path).unwrap();
    let collections = db.collection_names().unwrap();
    assert!(collections.contains(&names::MESSENGERS.to_string()));
}

#[test]
fn test_unknown_fields_are_preserved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    let store: Arc<dyn CollectionStore> = Arc::new(JsonFileStore::open(&path).unwrap());

    store
        .set(
            names::MESSENGERS,
            &[json!({
                "id": "m1",
                "firstName": "Elena",
                "lastName": "Castillo",
                "status": "available",
                "points": 0,
                "licenseExpiry": "2026-01-31",
                "phone": "809-555-0101"
            })],
        )
        .unwrap();

    let fleet = FleetDirectory::new(Arc::clone(&store));
    fleet.set_cached_points("m1", 25).unwrap();

    let raw = store.get(names::MESSENGERS).unwrap();
    assert_eq!(raw[0]["points"], 25);
    assert_eq!(raw[0]["licenseExpiry"], "2026-01-31");
    assert_eq!(raw[0]["phone"], "809-555-0101");
}

#[test]
fn test_corrupt_json_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(&path, "{ \"messengers\": [").unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    assert!(matches!(
        store.get(names::MESSENGERS),
        Err(StoreError::Corrupt(_))
    ));
}

#[test]
fn test_open_store_follows_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");

    let mut cfg: AppConfig = config::load_config_from(&config_path).unwrap();
    cfg.storage.backend = StorageBackend::Sqlite;
    config::save_config_to(&cfg, &config_path).unwrap();

    let loaded = config::load_config_from(&config_path).unwrap();
    let store = open_store(&loaded).unwrap();
    assert_eq!(store.backend_name(), "sqlite");
    assert!(dir.path().join("logitrack.db").exists());
}
