//! CLI command implementations.

pub mod classify;
pub mod config;
pub mod credential;
pub mod probe;
pub mod providers;
pub mod run;

use std::sync::Arc;

use anyhow::{Context, Result};
use switchyard_fetch::{CancellationToken, HttpProxyRelay, ReqwestExecutor, ResilientTransport};
use switchyard_providers::Orchestrator;
use switchyard_store::{Settings, open_credential_store};
use tracing::{debug, warn};

/// Builds the transport and orchestrator from settings.
pub fn build_orchestrator(settings: &Settings) -> Result<Orchestrator> {
    let transport_settings = settings.transport_settings();
    let executor = ReqwestExecutor::new(&transport_settings.user_agent)
        .context("Failed to create HTTP client")?;
    let credentials = open_credential_store(&settings.credentials);
    let relay = settings.proxy.relay_url.as_ref().map(|endpoint| {
        debug!(relay = %endpoint, "Proxy relay configured");
        Arc::new(HttpProxyRelay::new(executor.client().clone(), endpoint.clone()))
    });

    let mut builder =
        ResilientTransport::builder(Arc::new(executor), credentials).settings(transport_settings);
    if let Some(relay) = relay {
        builder = builder.relay(relay);
    }

    let orchestrator = Orchestrator::builtin(Arc::new(builder.build()))
        .context("Built-in provider catalog is inconsistent")?
        .with_settings(settings.orchestrator_settings());
    Ok(orchestrator)
}

/// A token cancelled on Ctrl-C.
pub fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            guard.cancel();
        }
    });
    cancel
}

/// Settings with an in-memory credential store and no environment overlay.
#[cfg(test)]
pub fn memory_settings() -> Settings {
    let mut settings = Settings::default();
    settings.credentials.backend = switchyard_store::CredentialBackend::Memory;
    settings.credentials.env_overlay = false;
    settings
}
