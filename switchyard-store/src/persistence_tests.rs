//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, JSON persistence, and settings round-trip.

use tempfile::TempDir;

use crate::persistence::{load_json, load_json_or_default, save_json};
use crate::settings::{CredentialBackend, LogLevel, Settings, SettingsStore};

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    save_json(&nested_path, &serde_json::json!({"key": "value"}))
        .await
        .unwrap();
    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_overwrite_replaces_content() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("doc.json");

    save_json(&path, &serde_json::json!({"v": 1})).await.unwrap();
    save_json(&path, &serde_json::json!({"v": 2})).await.unwrap();

    let loaded: serde_json::Value = load_json(&path).await.unwrap();
    assert_eq!(loaded["v"], 2);
}

#[tokio::test]
async fn test_load_or_default_on_garbage() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    tokio::fs::write(&path, "{ this is not json").await.unwrap();

    let settings: Settings = load_json_or_default(&path).await;
    assert_eq!(settings, Settings::default());
}

// ============================================================================
// Settings Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_settings_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");

    let store = SettingsStore::new(path.clone());
    store
        .update(|s| {
            s.transport.min_interval_ms = 250;
            s.transport.max_attempts = 5;
            s.orchestrator.max_providers = 3;
            s.orchestrator.multi_provider_confidence = 0.25;
            s.proxy.relay_url = Some("https://relay.example/forward".into());
            s.credentials.backend = CredentialBackend::File;
            s.credentials.file = Some(temp_dir.path().join("creds.json"));
            s.log_level = LogLevel::Debug;
        })
        .await;
    store.save().await.unwrap();

    let loaded = SettingsStore::load(path).await.unwrap().get().await;
    assert_eq!(loaded, store.get().await);
    assert_eq!(loaded.transport_settings().max_attempts, 5);
    assert_eq!(loaded.orchestrator_settings().max_providers, 3);
}

#[tokio::test]
async fn test_missing_file_loads_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let store = SettingsStore::load(temp_dir.path().join("absent.json"))
        .await
        .unwrap();
    assert_eq!(store.get().await, Settings::default());
}

#[tokio::test]
async fn test_load_minimal_json_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    tokio::fs::write(&path, r#"{ "transport": { "max_attempts": 1 }, "log_level": "trace" }"#)
        .await
        .unwrap();

    let settings = SettingsStore::load(path).await.unwrap().get().await;
    assert_eq!(settings.transport.max_attempts, 1);
    assert_eq!(settings.transport.timeout_ms, 15_000);
    assert_eq!(settings.log_level, LogLevel::Trace);
    assert_eq!(settings.credentials.backend, CredentialBackend::Keychain);
}

#[tokio::test]
async fn test_load_json_with_unknown_fields() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    tokio::fs::write(&path, r#"{ "theme": "dark", "proxy": { "relay_url": null, "extra": 1 } }"#)
        .await
        .unwrap();

    let settings = SettingsStore::load(path).await.unwrap().get().await;
    assert!(settings.proxy.relay_url.is_none());
}

#[tokio::test]
async fn test_load_rejects_malformed_and_invalid() {
    let temp_dir = TempDir::new().unwrap();

    let malformed = temp_dir.path().join("malformed.json");
    tokio::fs::write(&malformed, "[1, 2").await.unwrap();
    assert!(SettingsStore::load(malformed).await.is_err());

    let invalid = temp_dir.path().join("invalid.json");
    tokio::fs::write(&invalid, r#"{ "orchestrator": { "max_providers": 0 } }"#)
        .await
        .unwrap();
    assert!(SettingsStore::load(invalid).await.is_err());
}

#[tokio::test]
async fn test_every_backend_roundtrips() {
    let temp_dir = TempDir::new().unwrap();
    for backend in CredentialBackend::all() {
        let path = temp_dir.path().join(format!("settings_{backend}.json"));
        let mut settings = Settings::default();
        settings.credentials.backend = *backend;

        save_json(&path, &settings).await.unwrap();
        let loaded: Settings = load_json(&path).await.unwrap();
        assert_eq!(loaded.credentials.backend, *backend, "Failed for {backend}");
    }
}
