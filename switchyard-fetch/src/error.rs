//! Transport error types.

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use switchyard_core::ErrorSummary;
use thiserror::Error;

/// HTTP statuses retried by default.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Maximum number of body bytes kept on an [`TransportError::HttpStatus`].
const MAX_ERROR_BODY: usize = 2048;

// ============================================================================
// Error Kind
// ============================================================================

/// Coarse classification of a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credential missing or rejected.
    Authentication,
    /// Attempt exceeded its timeout.
    Timeout,
    /// Connection-level failure.
    Network,
    /// Non-2xx HTTP response.
    HttpStatus,
    /// Proxy mode needed but no relay reachable.
    ProxyUnavailable,
    /// Caller cancelled the call.
    Cancelled,
    /// The request could not be built.
    InvalidRequest,
}

impl ErrorKind {
    /// Stable machine code used in error summaries.
    pub fn code(self) -> &'static str {
        match self {
            Self::Authentication => "transport.authentication",
            Self::Timeout => "transport.timeout",
            Self::Network => "transport.network",
            Self::HttpStatus => "transport.http_status",
            Self::ProxyUnavailable => "transport.proxy_unavailable",
            Self::Cancelled => "transport.cancelled",
            Self::InvalidRequest => "transport.invalid_request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// Transport Error
// ============================================================================

/// Error returned by the resilient transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// A required credential is not configured.
    #[error("Missing credential: {credential}")]
    Authentication {
        /// Name of the credential that was looked up.
        credential: String,
    },

    /// The attempt did not finish in time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection reset, DNS failure, access-policy block, etc.
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// Proxy mode was required but no relay could be reached.
    #[error("Proxy relay unavailable: {0}")]
    ProxyUnavailable(String),

    /// The call was cancelled by the caller.
    #[error("Request cancelled")]
    Cancelled,

    /// The request could not be constructed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Creates an HTTP status error, truncating long bodies.
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Self::HttpStatus { status, body }
    }

    /// Returns the coarse kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Network(_) => ErrorKind::Network,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::ProxyUnavailable(_) => ErrorKind::ProxyUnavailable,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Returns the HTTP status, for status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Default retry classification: network failures, timeouts and the
    /// [`RETRYABLE_STATUSES`] set.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::HttpStatus { status, .. } => RETRYABLE_STATUSES.contains(status),
            _ => false,
        }
    }

    /// Returns true if the error text looks like an origin or
    /// access-policy block.
    pub fn is_origin_block(&self) -> bool {
        match self {
            Self::Network(message) => origin_block_pattern().is_some_and(|re| re.is_match(message)),
            _ => false,
        }
    }

    /// Flattens the error for results and logs.
    pub fn to_summary(&self) -> ErrorSummary {
        let summary = ErrorSummary::new(self.kind().code(), self.to_string());
        match self.status() {
            Some(status) => summary.with_status(status),
            None => summary,
        }
    }
}

fn origin_block_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"(?i)\bcors\b|cross[- ]origin|access-control-allow-origin|blocked by [a-z ]*policy",
            )
            .ok()
        })
        .as_ref()
}

// ============================================================================
// Tests
// ============================================================================
