//! Per-call request context and transport settings.
//!
//! A [`RequestContext`] is built fresh for every call and consumed by the
//! transport. Unset limits fall back to [`TransportSettings`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Caller-supplied retry predicate, consulted after the default set.
pub type RetryPredicate = Arc<dyn Fn(&TransportError) -> bool + Send + Sync>;

// ============================================================================
// HTTP Method
// ============================================================================

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET.
    #[default]
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Transport Settings
// ============================================================================

/// Process-wide transport defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Minimum spacing between call starts.
    pub min_interval: Duration,
    /// Default per-attempt timeout.
    pub timeout: Duration,
    /// Default attempt budget.
    pub max_attempts: u32,
    /// Backoff base delay.
    pub base_delay: Duration,
    /// User-Agent sent by the HTTP executor.
    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(500),
            timeout: Duration::from_secs(15),
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            user_agent: concat!("Switchyard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ============================================================================
// Request Context
// ============================================================================

/// One outbound request plus its call-level policy.
#[derive(Clone)]
pub struct RequestContext {
    /// Target URL.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Request headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<String>,
    /// Per-attempt timeout, or the transport default.
    pub timeout: Option<Duration>,
    /// Attempt budget, or the transport default.
    pub max_attempts: Option<u32>,
    /// Skips the global rate limiter.
    pub bypass_rate_limit: bool,
    /// Extra retry predicate.
    pub retry_predicate: Option<RetryPredicate>,
}

impl RequestContext {
    /// Creates a request with the given method and URL.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            body: None,
            timeout: None,
            max_attempts: None,
            bypass_rate_limit: false,
            retry_predicate: None,
        }
    }

    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request with a JSON body.
    pub fn post_json(url: impl Into<String>, body: &serde_json::Value) -> Self {
        Self::new(HttpMethod::Post, url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
    }

    /// Adds a header, replacing an existing one with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets a header in place (case-insensitive name match).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            existing.1 = value;
        } else {
            self.headers.push((name, value));
        }
    }

    /// Returns a header value (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the attempt budget.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Skips the global rate limiter for this call.
    pub fn bypass_rate_limit(mut self) -> Self {
        self.bypass_rate_limit = true;
        self
    }

    /// Adds a retry predicate.
    pub fn retry_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&TransportError) -> bool + Send + Sync + 'static,
    {
        self.retry_predicate = Some(Arc::new(predicate));
        self
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values can carry credentials.
        let header_names: Vec<&str> = self.headers.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("has_body", &self.body.is_some())
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("bypass_rate_limit", &self.bypass_rate_limit)
            .field("retry_predicate", &self.retry_predicate.is_some())
            .finish()
    }
}
