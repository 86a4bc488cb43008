//! The provider contract.
//!
//! Every concrete data source implements [`Provider`] with a single
//! [`Provider::invoke`] method and is registered once, at startup, through
//! its [`ProviderDescriptor`](crate::ProviderDescriptor).

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use switchyard_core::{ProviderData, ProviderId};
use switchyard_fetch::{
    AuthConfig, CancellationToken, RequestContext, ResilientTransport, ResponseBody,
    TransportError,
};
use url::Url;

use crate::error::ProviderError;

/// Default number of items requested from list-style providers.
pub const DEFAULT_LIMIT: usize = 5;

// ============================================================================
// Invoke Options
// ============================================================================

/// Caller options applied to every provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeOptions {
    /// Maximum number of result items.
    pub limit: usize,
    /// Per-attempt timeout override.
    pub timeout: Option<Duration>,
    /// Attempt budget override.
    pub max_attempts: Option<u32>,
    /// Skip the global rate limiter.
    pub bypass_rate_limit: bool,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            timeout: None,
            max_attempts: None,
            bypass_rate_limit: false,
        }
    }
}

impl InvokeOptions {
    /// Applies the overrides to a request.
    pub fn apply(&self, mut ctx: RequestContext) -> RequestContext {
        if let Some(timeout) = self.timeout {
            ctx = ctx.timeout(timeout);
        }
        if let Some(attempts) = self.max_attempts {
            ctx = ctx.max_attempts(attempts);
        }
        if self.bypass_rate_limit {
            ctx = ctx.bypass_rate_limit();
        }
        ctx
    }

    /// Limit as a query-string value, clamped to `1..=50`.
    pub fn limit_param(&self) -> String {
        self.limit.clamp(1, 50).to_string()
    }
}

// ============================================================================
// Invoke Context
// ============================================================================

/// Call-scoped handles passed to [`Provider::invoke`].
#[derive(Debug, Clone, Copy)]
pub struct InvokeContext<'a> {
    /// Id of the provider being invoked.
    pub provider_id: &'a ProviderId,
    /// The provider's auth shape.
    pub auth: &'a AuthConfig,
    /// Shared transport.
    pub transport: &'a ResilientTransport,
    /// Caller cancellation.
    pub cancel: &'a CancellationToken,
}

impl InvokeContext<'_> {
    /// Sends a request through the transport with this provider's auth.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Transport`] for any transport failure.
    pub async fn fetch(&self, request: RequestContext) -> Result<ResponseBody, ProviderError> {
        let auth = (!self.auth.is_none()).then_some(self.auth);
        let response = self
            .transport
            .call(request, auth, Some(self.provider_id.as_str()), self.cancel)
            .await?;
        Ok(response.body)
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// A single external data source behind a uniform contract.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Runs the query and normalizes the response.
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError>;
}

// ============================================================================
// Helpers
// ============================================================================

/// Decodes a JSON (or JSON-looking text) body into `T`.
///
/// # Errors
///
/// [`ProviderError::Parse`] for binary bodies and shape mismatches.
pub fn decode_json<T: DeserializeOwned>(body: &ResponseBody) -> Result<T, ProviderError> {
    match body {
        ResponseBody::Json(value) => Ok(T::deserialize(value)?),
        ResponseBody::Text(text) => Ok(serde_json::from_str(text)?),
        ResponseBody::Binary(bytes) => Err(ProviderError::Parse(format!(
            "expected JSON, got {} binary bytes",
            bytes.len()
        ))),
    }
}

/// Returns the trimmed query, or an error if it is blank.
///
/// # Errors
///
/// [`ProviderError::InvalidQuery`] for blank queries.
pub fn require_query(query: &str) -> Result<&str, ProviderError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(ProviderError::InvalidQuery("query is empty".to_string()))
    } else {
        Ok(trimmed)
    }
}

/// Appends query parameters to `base`.
///
/// # Errors
///
/// [`TransportError::InvalidRequest`] if `base` is not an absolute URL.
pub fn build_url(base: &str, params: &[(&str, &str)]) -> Result<String, ProviderError> {
    Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| TransportError::InvalidRequest(format!("bad URL {base}: {e}")).into())
}

/// Maps data with neither items nor summary to [`ProviderError::EmptyResult`].
///
/// # Errors
///
/// [`ProviderError::EmptyResult`] for empty data.
pub fn non_empty(data: ProviderData) -> Result<ProviderData, ProviderError> {
    if data.is_empty() {
        Err(ProviderError::EmptyResult)
    } else {
        Ok(data)
    }
}
