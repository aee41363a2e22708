use ppr_core::config::PprConfig;
use ppr_core::model::*;
use ppr_core::storage;
use ppr_core::store::EntityStore;
use tempfile::TempDir;

fn sample_store() -> EntityStore {
    let mut store = EntityStore::new();
    store
        .create_node("Gear", NodeType::Product1, Attributes::empty_groups())
        .unwrap();
    store
        .create_node("Mill", NodeType::Process, Attributes::empty_groups())
        .unwrap();
    store
        .create_relation(ProductLine::One, "Gear", RelationKind::InputFor, "Mill")
        .unwrap();
    store
}

#[test]
fn test_save_and_load_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let config = PprConfig::default();

    let store = sample_store();
    storage::save(root, &config, &store).unwrap();
    assert!(storage::exists(root, &config));
    assert!(root.join(".ppr").join("graph.json").exists());

    let loaded = storage::load(root, &config).unwrap();
    assert_eq!(loaded, store);
}

#[test]
fn test_custom_document_name() {
    let tmp = TempDir::new().unwrap();
    let mut config = PprConfig::default();
    config.storage.document = "line-a.json".to_string();

    storage::save(tmp.path(), &config, &sample_store()).unwrap();
    assert!(tmp.path().join(".ppr").join("line-a.json").exists());
}

#[test]
fn test_exists_false() {
    let tmp = TempDir::new().unwrap();
    assert!(!storage::exists(tmp.path(), &PprConfig::default()));
}

#[test]
fn test_load_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    let result = storage::load_file(&tmp.path().join("missing.json"));
    assert!(result.is_err());
}

#[test]
fn test_load_file_reports_invalid_json() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = storage::load_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid PPR document"));
}
