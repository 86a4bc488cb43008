// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Switchyard Store
//!
//! Persistent configuration for Switchyard.
//!
//! This crate provides:
//!
//! - **Settings**: transport, orchestration, proxy and credential settings
//! - **SettingsStore**: settings bound to their JSON file
//! - **FileCredentialStore**: an owner-only JSON credential file
//! - **Persistence**: atomic, permission-restricted JSON I/O
//!
//! ## Usage
//!
//! ```ignore
//! use switchyard_store::{SettingsStore, open_credential_store};
//!
//! let settings = SettingsStore::load_default().await?.get().await;
//! let credentials = open_credential_store(&settings.credentials);
//! let transport_settings = settings.transport_settings();
//! ```

pub mod credentials;
pub mod error;
pub mod persistence;
pub mod settings;

pub use credentials::{FileCredentialStore, open_credential_store};
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_credentials_path, default_settings_path, ensure_dir, load_json,
    load_json_or_default, save_json,
};
pub use settings::{
    CredentialBackend, CredentialsConfig, LogLevel, OrchestratorConfig, ProxyConfig, Settings,
    SettingsStore, TransportConfig,
};
#[cfg(test)]
mod persistence_tests;
