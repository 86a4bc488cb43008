//! Credential storage.
//!
//! Credentials are opaque strings keyed by a name such as `brave` or
//! `tmdb`. Stores never raise: a lookup that fails for any reason is
//! reported as "not configured" and a failed write as `false`.
//!
//! Implementations:
//! - [`KeychainCredentialStore`] - System keychain via `keyring`
//! - [`MemoryCredentialStore`] - Process-local map
//! - [`EnvOverlayCredentialStore`] - `SWITCHYARD_<NAME>` variables over another store
//!
//! Values are read on every call; nothing here caches across calls.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

/// Service name prefix for Switchyard keychain entries.
const SERVICE_PREFIX: &str = "switchyard";

/// Keychain account holding provider credentials.
const ACCOUNT: &str = "credential";

/// Prefix of credential environment variables.
pub const ENV_PREFIX: &str = "SWITCHYARD_";

// ============================================================================
// Credential Store Trait
// ============================================================================

/// Persistent name → secret lookup.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the secret, or `None` if absent or unreadable.
    async fn get(&self, name: &str) -> Option<String>;

    /// Stores the secret. Returns `false` if storage failed.
    async fn set(&self, name: &str, secret: &str) -> bool;

    /// Returns true if a non-empty secret exists.
    async fn has(&self, name: &str) -> bool {
        self.get(name).await.is_some_and(|s| !s.is_empty())
    }

    /// Short label for logs and `probe` output.
    fn label(&self) -> &'static str;
}

// ============================================================================
// System Keychain
// ============================================================================

/// Credential store backed by the system keychain.
///
/// - macOS: Keychain Services
/// - Windows: Credential Manager
/// - Linux: Secret Service (GNOME Keyring, KDE Wallet)
#[derive(Debug, Clone, Default)]
pub struct KeychainCredentialStore;

impl KeychainCredentialStore {
    /// Creates a keychain store.
    pub fn new() -> Self {
        Self
    }

    /// Builds the full service name with prefix.
    fn full_service(name: &str) -> String {
        format!("{SERVICE_PREFIX}:{name}")
    }

    fn entry(name: &str) -> Option<Entry> {
        match Entry::new(&Self::full_service(name), ACCOUNT) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(credential = %name, error = %e, "Failed to create keychain entry");
                None
            }
        }
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn get(&self, name: &str) -> Option<String> {
        let entry = Self::entry(name)?;
        match entry.get_password() {
            Ok(secret) if !secret.is_empty() => {
                debug!(credential = %name, "Credential found in keychain");
                Some(secret)
            }
            // Empty password or no entry both mean "not configured"
            Ok(_) | Err(keyring::Error::NoEntry) => {
                debug!(credential = %name, "Credential not in keychain");
                None
            }
            Err(e) => {
                warn!(credential = %name, error = %e, "Failed to read keychain");
                None
            }
        }
    }

    async fn set(&self, name: &str, secret: &str) -> bool {
        let Some(entry) = Self::entry(name) else {
            return false;
        };
        match entry.set_password(secret) {
            Ok(()) => {
                debug!(credential = %name, "Credential stored in keychain");
                true
            }
            Err(e) => {
                warn!(credential = %name, error = %e, "Failed to write keychain");
                false
            }
        }
    }

    fn label(&self) -> &'static str {
        "keychain"
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Process-local credential map. Used by tests and `--credentials memory`.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `(name, secret)` pairs.
    pub fn with_secrets<I, K, V>(secrets: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = secrets
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            secrets: RwLock::new(map),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, name: &str) -> Option<String> {
        self.secrets.read().ok()?.get(name).cloned()
    }

    async fn set(&self, name: &str, secret: &str) -> bool {
        match self.secrets.write() {
            Ok(mut secrets) => {
                secrets.insert(name.to_string(), secret.to_string());
                true
            }
            Err(_) => false,
        }
    }

    fn label(&self) -> &'static str {
        "memory"
    }
}

// ============================================================================
// Environment Overlay
// ============================================================================

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Consults `SWITCHYARD_<NAME>` environment variables before a backing store.
///
/// Writes always go to the backing store.
#[derive(Clone)]
pub struct EnvOverlayCredentialStore {
    inner: Arc<dyn CredentialStore>,
    lookup: EnvLookup,
}

impl EnvOverlayCredentialStore {
    /// Overlays the process environment on `inner`.
    pub fn new(inner: Arc<dyn CredentialStore>) -> Self {
        Self::with_lookup(inner, |key| std::env::var(key).ok())
    }

    /// Overlays a custom variable source on `inner`.
    pub fn with_lookup<F>(inner: Arc<dyn CredentialStore>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            inner,
            lookup: Arc::new(lookup),
        }
    }

    /// Environment variable name for a credential (`tmdb` → `SWITCHYARD_TMDB`).
    pub fn variable_name(name: &str) -> String {
        let suffix: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{ENV_PREFIX}{suffix}")
    }
}

impl fmt::Debug for EnvOverlayCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvOverlayCredentialStore")
            .field("inner", &self.inner.label())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialStore for EnvOverlayCredentialStore {
    async fn get(&self, name: &str) -> Option<String> {
        let var = Self::variable_name(name);
        if let Some(value) = (self.lookup)(&var).filter(|v| !v.is_empty()) {
            debug!(credential = %name, variable = %var, "Credential from environment");
            return Some(value);
        }
        self.inner.get(name).await
    }

    async fn set(&self, name: &str, secret: &str) -> bool {
        self.inner.set(name, secret).await
    }

    fn label(&self) -> &'static str {
        self.inner.label()
    }
}

// ============================================================================
// Tests
// ============================================================================
