//! Shared fixtures for provider tests.

use std::sync::Arc;
use std::time::Duration;

use switchyard_core::{ProviderData, ProviderId};
use switchyard_fetch::{
    CancellationToken, MemoryCredentialStore, ResilientTransport, ReqwestExecutor,
    TransportSettings,
};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions};

/// Real HTTP transport with no spacing and a single attempt.
pub(crate) fn http_transport(secrets: &[(&str, &str)]) -> ResilientTransport {
    let settings = TransportSettings {
        min_interval: Duration::ZERO,
        timeout: Duration::from_secs(5),
        max_attempts: 1,
        base_delay: Duration::from_millis(1),
        ..TransportSettings::default()
    };
    let executor = ReqwestExecutor::new(&settings.user_agent).expect("client");
    ResilientTransport::builder(
        Arc::new(executor),
        Arc::new(MemoryCredentialStore::with_secrets(secrets.iter().copied())),
    )
    .settings(settings)
    .build()
}

/// Invokes a descriptor's provider the way the orchestrator does.
pub(crate) async fn invoke(
    descriptor: &ProviderDescriptor,
    transport: &ResilientTransport,
    query: &str,
) -> Result<ProviderData, ProviderError> {
    let cancel = CancellationToken::new();
    let id: &ProviderId = &descriptor.id;
    let ctx = InvokeContext {
        provider_id: id,
        auth: &descriptor.auth,
        transport,
        cancel: &cancel,
    };
    descriptor
        .provider()
        .invoke(query, &InvokeOptions::default(), &ctx)
        .await
}
