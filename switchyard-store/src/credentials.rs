//! File-backed credentials and backend selection.
//!
//! [`FileCredentialStore`] keeps a flat `{ "name": "secret" }` JSON object in
//! an owner-only file. The file is read on every lookup.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use switchyard_fetch::{
    CredentialStore, EnvOverlayCredentialStore, KeychainCredentialStore, MemoryCredentialStore,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::persistence::{default_credentials_path, load_json, save_json};
use crate::settings::{CredentialBackend, CredentialsConfig};

type SecretMap = BTreeMap<String, String>;

// ============================================================================
// File Store
// ============================================================================

/// Credential store backed by an owner-only JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Creates a store for `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SecretMap, StoreError> {
        match load_json(&self.path).await {
            Err(e) if e.is_not_found() => Ok(SecretMap::new()),
            other => other,
        }
    }

    async fn write(&self, name: &str, secret: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut secrets = self.read().await?;
        secrets.insert(name.to_string(), secret.to_string());
        save_json(&self.path, &secrets).await
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, name: &str) -> Option<String> {
        match self.read().await {
            Ok(mut secrets) => secrets.remove(name),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Credential file unreadable");
                None
            }
        }
    }

    async fn set(&self, name: &str, secret: &str) -> bool {
        match self.write(name, secret).await {
            Ok(()) => {
                debug!(credential = %name, "Stored credential in file");
                true
            }
            Err(e) => {
                warn!(credential = %name, error = %e, "Failed to store credential");
                false
            }
        }
    }

    fn label(&self) -> &'static str {
        "file"
    }
}

// ============================================================================
// Backend Selection
// ============================================================================

/// Opens the configured credential backend.
pub fn open_credential_store(config: &CredentialsConfig) -> Arc<dyn CredentialStore> {
    let base: Arc<dyn CredentialStore> = match config.backend {
        CredentialBackend::Keychain => Arc::new(KeychainCredentialStore::new()),
        CredentialBackend::File => Arc::new(FileCredentialStore::new(
            config.file.clone().unwrap_or_else(default_credentials_path),
        )),
        CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
    };
    debug!(backend = %config.backend, env_overlay = config.env_overlay, "Opened credential store");

    if config.env_overlay {
        Arc::new(EnvOverlayCredentialStore::new(base))
    } else {
        base
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get_roundtrips_exactly() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("credentials.json"));

        let secret = "  sk-ünïcødé/+=\n\ttail ";
        assert!(store.set("tmdb", secret).await);
        assert_eq!(store.get("tmdb").await.as_deref(), Some(secret));
        assert!(store.has("tmdb").await);
        assert!(!store.has("brave").await);
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(temp_dir.path().join("none.json"));
        assert!(store.get("brave").await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_reports_absent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("credentials.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.get("brave").await.is_none());
        assert!(!store.set("brave", "k").await);
    }

    #[tokio::test]
    async fn test_concurrent_writes_keep_every_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileCredentialStore::new(
            temp_dir.path().join("credentials.json"),
        ));

        let writes = ["brave", "serpapi", "newsapi", "gnews"].map(|name| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.set(name, &format!("{name}-key")).await })
        });
        for write in writes {
            assert!(write.await.unwrap());
        }
        for name in ["brave", "serpapi", "newsapi", "gnews"] {
            assert_eq!(store.get(name).await, Some(format!("{name}-key")));
        }
    }

    #[tokio::test]
    async fn test_open_file_backend() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = CredentialsConfig {
            backend: CredentialBackend::File,
            file: Some(temp_dir.path().join("c.json")),
            env_overlay: false,
        };
        let store = open_credential_store(&config);
        assert_eq!(store.label(), "file");
        assert!(store.set("omdb", "k").await);
        assert!(temp_dir.path().join("c.json").exists());
    }

    #[tokio::test]
    async fn test_open_memory_backend_with_overlay() {
        let config = CredentialsConfig {
            backend: CredentialBackend::Memory,
            file: None,
            env_overlay: true,
        };
        let store = open_credential_store(&config);
        assert_eq!(store.label(), "memory");
        assert!(store.set("finnhub", "k").await);
        assert_eq!(store.get("finnhub").await.as_deref(), Some("k"));
    }
}
