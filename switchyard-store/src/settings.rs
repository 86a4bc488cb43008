//! Runtime settings.
//!
//! A single JSON document at [`default_settings_path`]. Every field has a
//! default, so a missing file or a partial document both load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use switchyard_fetch::TransportSettings;
use switchyard_providers::{
    DEFAULT_MAX_PROVIDERS, DEFAULT_MULTI_PROVIDER_CONFIDENCE, OrchestratorSettings,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

// ============================================================================
// Settings Types
// ============================================================================

/// Runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Transport policy.
    pub transport: TransportConfig,
    /// Orchestration defaults.
    pub orchestrator: OrchestratorConfig,
    /// Cross-origin relay.
    pub proxy: ProxyConfig,
    /// Credential backend.
    pub credentials: CredentialsConfig,
    /// Log level used when no `RUST_LOG` is set.
    pub log_level: LogLevel,
}

/// Transport policy, in milliseconds where applicable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Minimum spacing between call starts.
    pub min_interval_ms: u64,
    /// Per-attempt timeout.
    pub timeout_ms: u64,
    /// Attempts per call.
    pub max_attempts: u32,
    /// Backoff base delay.
    pub base_delay_ms: u64,
    /// User-Agent header.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        let defaults = TransportSettings::default();
        Self {
            min_interval_ms: millis(defaults.min_interval),
            timeout_ms: millis(defaults.timeout),
            max_attempts: defaults.max_attempts,
            base_delay_ms: millis(defaults.base_delay),
            user_agent: defaults.user_agent,
        }
    }
}

/// Orchestration defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Providers run concurrently in multi mode.
    pub max_providers: usize,
    /// Classifier confidence below which multi mode is the default.
    pub multi_provider_confidence: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_providers: DEFAULT_MAX_PROVIDERS,
            multi_provider_confidence: DEFAULT_MULTI_PROVIDER_CONFIDENCE,
        }
    }
}

/// Cross-origin relay settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Relay endpoint. Proxy mode is unavailable without one.
    pub relay_url: Option<String>,
}

/// Where credentials are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    /// System keychain.
    #[default]
    Keychain,
    /// Owner-only JSON file.
    File,
    /// Process memory; nothing persists.
    Memory,
}

impl CredentialBackend {
    /// All backends.
    pub fn all() -> &'static [CredentialBackend] {
        &[
            CredentialBackend::Keychain,
            CredentialBackend::File,
            CredentialBackend::Memory,
        ]
    }
}

impl std::fmt::Display for CredentialBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialBackend::Keychain => write!(f, "keychain"),
            CredentialBackend::File => write!(f, "file"),
            CredentialBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Credential backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Backend.
    pub backend: CredentialBackend,
    /// File for the `file` backend, defaults to `credentials.json` beside
    /// the settings.
    pub file: Option<PathBuf>,
    /// Consult `SWITCHYARD_<NAME>` variables first.
    pub env_overlay: bool,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            backend: CredentialBackend::default(),
            file: None,
            env_overlay: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Conversions and Validation
// ============================================================================

impl Settings {
    /// Transport settings for [`switchyard_fetch::ResilientTransport`].
    pub fn transport_settings(&self) -> TransportSettings {
        let t = &self.transport;
        TransportSettings {
            min_interval: Duration::from_millis(t.min_interval_ms),
            timeout: Duration::from_millis(t.timeout_ms),
            max_attempts: t.max_attempts,
            base_delay: Duration::from_millis(t.base_delay_ms),
            user_agent: t.user_agent.clone(),
        }
    }

    /// Orchestrator settings.
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            max_providers: self.orchestrator.max_providers,
            multi_provider_confidence: self.orchestrator.multi_provider_confidence,
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`StoreError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.transport.max_attempts == 0 {
            return Err(StoreError::Config(
                "transport.max_attempts must be at least 1".into(),
            ));
        }
        if self.transport.timeout_ms == 0 {
            return Err(StoreError::Config(
                "transport.timeout_ms must be positive".into(),
            ));
        }
        if self.orchestrator.max_providers == 0 {
            return Err(StoreError::Config(
                "orchestrator.max_providers must be at least 1".into(),
            ));
        }
        let confidence = self.orchestrator.multi_provider_confidence;
        if !confidence.is_finite() || confidence < 0.0 {
            return Err(StoreError::Config(format!(
                "orchestrator.multi_provider_confidence must be a non-negative number, got {confidence}"
            )));
        }
        if let Some(relay) = &self.proxy.relay_url {
            Url::parse(relay)
                .map_err(|e| StoreError::Config(format!("proxy.relay_url {relay:?}: {e}")))?;
        }
        Ok(())
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings bound to their file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store holding defaults.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for unreadable or malformed files and for
    /// out-of-range values.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = match load_json::<Settings>(&path).await {
            Ok(settings) => {
                info!(path = %path.display(), "Loaded settings");
                settings
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Settings file not found, using defaults");
                Settings::default()
            }
            Err(e) => return Err(e),
        };
        settings.validate()?;

        Ok(Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        })
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings are invalid or cannot be written.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        settings.validate()?;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
