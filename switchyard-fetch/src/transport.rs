//! Resilient transport: rate limiting, auth injection, timeouts, retries
//! with backoff and cross-origin recovery through a proxy relay.
//!
//! One [`ResilientTransport::call`] runs:
//!
//! 1. Wait for a slot on the process-wide [`RateLimiter`] (unless bypassed).
//! 2. Inject credentials per [`AuthConfig`]; a missing credential fails the
//!    call before any network traffic.
//! 3. Run up to `max_attempts` attempts, each under its own timeout, with
//!    exponential backoff and jitter between them.
//! 4. If the first attempt fails with an origin/access-policy block, re-issue
//!    the identical request through the [`ProxyRelay`] and stay in proxy
//!    mode for the remaining attempts.
//!
//! The caller's [`CancellationToken`] is honored at every suspension point.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::auth::AuthConfig;
use crate::body::ResponseBody;
use crate::context::{RequestContext, TransportSettings};
use crate::error::{ErrorKind, TransportError};
use crate::host::credentials::CredentialStore;
use crate::host::http::{HttpExecutor, HttpRequest};
use crate::host::proxy::{ProxyRelay, ProxyRequest};
use crate::rate_limit::RateLimiter;
use crate::retry::RetryPolicy;

// ============================================================================
// Attempt Result
// ============================================================================

/// Outcome of one network attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// The attempt produced a 2xx response.
    Success {
        /// 1-based attempt number.
        attempt: u32,
        /// Time spent on the attempt.
        duration: Duration,
        /// Whether the attempt went through the relay.
        via_proxy: bool,
    },
    /// The attempt failed.
    Failure {
        /// 1-based attempt number.
        attempt: u32,
        /// Error kind.
        kind: ErrorKind,
        /// HTTP status, for status errors.
        http_status: Option<u16>,
        /// Error message.
        message: String,
        /// Time spent on the attempt.
        duration: Duration,
        /// Whether the attempt went through the relay.
        via_proxy: bool,
    },
}

impl AttemptResult {
    fn failure(attempt: u32, error: &TransportError, duration: Duration, via_proxy: bool) -> Self {
        Self::Failure {
            attempt,
            kind: error.kind(),
            http_status: error.status(),
            message: error.to_string(),
            duration,
            via_proxy,
        }
    }

    /// Returns the 1-based attempt number.
    pub fn attempt(&self) -> u32 {
        match self {
            Self::Success { attempt, .. } | Self::Failure { attempt, .. } => *attempt,
        }
    }

    /// Returns true for successful attempts.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// ============================================================================
// Transport Response
// ============================================================================

/// Successful call result.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// Final status (relay responses report 200).
    pub status: u16,
    /// Decoded body.
    pub body: ResponseBody,
    /// Every attempt made, in order.
    pub attempts: Vec<AttemptResult>,
    /// Whether the response came through the relay.
    pub via_proxy: bool,
    /// Total time including rate-limit and backoff waits.
    pub elapsed: Duration,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ResilientTransport`].
pub struct TransportBuilder {
    executor: Arc<dyn HttpExecutor>,
    credentials: Arc<dyn CredentialStore>,
    relay: Option<Arc<dyn ProxyRelay>>,
    limiter: Option<Arc<RateLimiter>>,
    retry: Option<RetryPolicy>,
    settings: TransportSettings,
}

impl TransportBuilder {
    /// Sets the defaults (interval, timeout, attempts, backoff base).
    pub fn settings(mut self, settings: TransportSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the proxy relay.
    pub fn relay(mut self, relay: Arc<dyn ProxyRelay>) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Shares an existing limiter instead of creating one.
    pub fn limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Overrides the retry policy derived from the settings.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Builds the transport.
    pub fn build(self) -> ResilientTransport {
        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(RateLimiter::new(self.settings.min_interval)));
        let retry = self
            .retry
            .unwrap_or_else(|| RetryPolicy::new(self.settings.base_delay));
        ResilientTransport {
            executor: self.executor,
            credentials: self.credentials,
            relay: self.relay,
            limiter,
            retry,
            settings: self.settings,
        }
    }
}

// ============================================================================
// Resilient Transport
// ============================================================================

/// Network-call wrapper shared by every provider.
pub struct ResilientTransport {
    executor: Arc<dyn HttpExecutor>,
    credentials: Arc<dyn CredentialStore>,
    relay: Option<Arc<dyn ProxyRelay>>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    settings: TransportSettings,
}

impl std::fmt::Debug for ResilientTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientTransport")
            .field("credentials", &self.credentials.label())
            .field("relay", &self.relay.is_some())
            .field("retry", &self.retry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ResilientTransport {
    /// Starts a builder.
    pub fn builder(
        executor: Arc<dyn HttpExecutor>,
        credentials: Arc<dyn CredentialStore>,
    ) -> TransportBuilder {
        TransportBuilder {
            executor,
            credentials,
            relay: None,
            limiter: None,
            retry: None,
            settings: TransportSettings::default(),
        }
    }

    /// Credential store used for auth injection.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Transport defaults.
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Limiter that spaces every call start.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Whether a proxy relay is configured.
    pub fn has_relay(&self) -> bool {
        self.relay.is_some()
    }

    /// Performs one call.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Authentication`] if `auth` needs a missing credential
    /// - [`TransportError::HttpStatus`], [`TransportError::Network`] or
    ///   [`TransportError::Timeout`] from the last attempt
    /// - [`TransportError::ProxyUnavailable`] if proxy mode is needed without a relay
    /// - [`TransportError::Cancelled`] if `cancel` fires
    #[instrument(
        skip(self, ctx, auth, cancel),
        fields(
            provider = provider_hint.unwrap_or("-"),
            method = %ctx.method,
            target = %redact(&ctx.url)
        )
    )]
    pub async fn call(
        &self,
        mut ctx: RequestContext,
        auth: Option<&AuthConfig>,
        provider_hint: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        let started = Instant::now();
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        if !ctx.bypass_rate_limit {
            self.limiter.await_slot(cancel).await?;
        }

        if let Some(auth) = auth {
            auth.apply(&mut ctx, self.credentials.as_ref()).await?;
        }

        let timeout = ctx.timeout.unwrap_or(self.settings.timeout);
        let max_attempts = ctx.max_attempts.unwrap_or(self.settings.max_attempts).max(1);
        let request = HttpRequest {
            method: ctx.method,
            url: ctx.url,
            headers: ctx.headers,
            body: ctx.body,
        };

        let mut attempts = Vec::new();
        let mut proxy_mode = false;
        let mut attempt = 1;

        loop {
            if attempt > 1 {
                let delay = self.retry.delay_before(attempt);
                debug!(attempt, delay_ms = delay.as_millis(), "Backing off before retry");
                tokio::select! {
                    () = cancel.cancelled() => return Err(TransportError::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }
            }

            let mut attempt_start = Instant::now();
            let mut result = self.attempt(&request, proxy_mode, timeout, cancel).await;

            if attempt == 1 && !proxy_mode {
                if let Err(err) = &result {
                    if err.is_origin_block() {
                        attempts.push(AttemptResult::failure(
                            attempt,
                            err,
                            attempt_start.elapsed(),
                            false,
                        ));
                        warn!(
                            error = %err,
                            "Origin block on first attempt, switching to proxy mode"
                        );
                        if self.relay.is_none() {
                            return Err(TransportError::ProxyUnavailable(
                                "no relay configured".to_string(),
                            ));
                        }
                        proxy_mode = true;
                        attempt_start = Instant::now();
                        result = self.attempt(&request, true, timeout, cancel).await;
                    }
                }
            }

            match result {
                Ok((status, body)) => {
                    let duration = attempt_start.elapsed();
                    attempts.push(AttemptResult::Success {
                        attempt,
                        duration,
                        via_proxy: proxy_mode,
                    });
                    info!(
                        attempt,
                        status,
                        body = body.kind(),
                        via_proxy = proxy_mode,
                        duration = ?duration,
                        "Call succeeded"
                    );
                    return Ok(TransportResponse {
                        status,
                        body,
                        attempts,
                        via_proxy: proxy_mode,
                        elapsed: started.elapsed(),
                    });
                }
                Err(TransportError::Cancelled) => return Err(TransportError::Cancelled),
                Err(err) => {
                    attempts.push(AttemptResult::failure(
                        attempt,
                        &err,
                        attempt_start.elapsed(),
                        proxy_mode,
                    ));

                    let retry = attempt < max_attempts
                        && self.retry.should_retry(&err, ctx.retry_predicate.as_ref());
                    if !retry {
                        warn!(attempt, max_attempts, error = %err, "Call failed");
                        return Err(err);
                    }

                    debug!(attempt, error = %err, "Attempt failed, will retry");
                    attempt += 1;
                }
            }
        }
    }

    /// Runs one attempt under the timeout, directly or through the relay.
    async fn attempt(
        &self,
        request: &HttpRequest,
        via_proxy: bool,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(u16, ResponseBody), TransportError> {
        let work = async {
            if via_proxy {
                let relay = self.relay.as_ref().ok_or_else(|| {
                    TransportError::ProxyUnavailable("no relay configured".to_string())
                })?;
                let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                let reply = relay
                    .relay(ProxyRequest::from_request(request, timeout_ms))
                    .await?;
                Ok((200, ResponseBody::Json(reply.into_result()?)))
            } else {
                let response = self.executor.execute(request).await?;
                if !response.is_success() {
                    return Err(TransportError::http_status(
                        response.status,
                        response.text_lossy(),
                    ));
                }
                let body = ResponseBody::sniff(response.content_type.as_deref(), response.body);
                Ok((response.status, body))
            }
        };

        tokio::select! {
            () = cancel.cancelled() => Err(TransportError::Cancelled),
            outcome = tokio::time::timeout(timeout, work) => {
                outcome.unwrap_or(Err(TransportError::Timeout(timeout)))
            }
        }
    }
}

/// Scheme, host and path only; query strings may carry credentials.
fn redact(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => format!(
            "{}://{}{}",
            parsed.scheme(),
            parsed.host_str().unwrap_or(""),
            parsed.path()
        ),
        Err(_) => "<invalid url>".to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
