//! Integration tests for ConfigManager and configuration file handling
//!
//! These tests verify:
//! - Configuration loading and saving
//! - Default configuration generation
//! - Wiring a loaded configuration into file storage

use camino::Utf8PathBuf;
use questline::models::DEFAULT_STORAGE_QUOTA_BYTES;
use questline::storage::STORAGE_KEY;
use questline::{ConfigManager, FileStorage, QuestlineConfig, StorageBackend};
use std::fs;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.config_dir(), &config_path);
    assert_eq!(
        manager.config_path(),
        &config_path.join("Questline Config.yaml")
    );
}

#[test]
fn test_creates_missing_config_directory() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("nested").join("settings");

    assert_ok!(ConfigManager::new(&nested));

    assert!(nested.exists());
}

#[test]
fn test_load_default_config() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let config = assert_ok!(manager.load_config());

    assert_eq!(config.data_dir, "Questline Data");
    assert_eq!(config.storage_quota_bytes, Some(DEFAULT_STORAGE_QUOTA_BYTES));
    assert_eq!(config.log_prefix, "questline");
}

#[test]
fn test_saved_config_is_yaml() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_ok!(manager.save_config(&QuestlineConfig::default()));

    let content = fs::read_to_string(manager.config_path()).unwrap();
    assert!(content.contains("data_dir: Questline Data"));
    assert!(content.contains("debug_mode: false"));
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(manager.config_path(), "log_prefix: quests\n").unwrap();

    let config = assert_ok!(manager.load_config());

    assert_eq!(config.log_prefix, "quests");
    assert_eq!(config.data_dir, "Questline Data");
    assert!(config.console_logging);
}

#[test]
fn test_malformed_file_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    fs::write(manager.config_path(), "data_dir: [unterminated").unwrap();

    assert_err!(manager.load_config());
}

#[test]
fn test_config_drives_file_storage() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();
    let config = QuestlineConfig {
        data_dir: config_path.join("data"),
        storage_quota_bytes: Some(8),
        ..QuestlineConfig::default()
    };
    manager.save_config(&config).unwrap();

    let loaded = manager.load_config().unwrap();
    let storage = FileStorage::open(&loaded.data_dir, loaded.storage_quota_bytes).unwrap();

    assert!(loaded.data_dir.exists());
    assert_ok!(storage.set_item(STORAGE_KEY, "{}"));
    assert_err!(storage.set_item(STORAGE_KEY, "{\"too\": \"large\"}"));
    assert_eq!(storage.get_item(STORAGE_KEY).unwrap().as_deref(), Some("{}"));
}
