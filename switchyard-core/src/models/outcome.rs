//! Orchestration outcome and health types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::data::ProviderData;
use super::provider::ProviderId;

// ============================================================================
// Error Summary
// ============================================================================

/// Flattened description of a failure, safe to serialize and show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Stable machine code (e.g. `transport.timeout`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// HTTP status, for status errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl ErrorSummary {
    /// Creates a summary without an HTTP status.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            http_status: None,
        }
    }

    /// Attaches an HTTP status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }
}

/// A candidate that was tried (or skipped) and did not produce data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFailure {
    /// The candidate provider.
    pub provider_id: ProviderId,
    /// Why it failed.
    pub error: ErrorSummary,
    /// True when the candidate was skipped before any network call.
    #[serde(default)]
    pub skipped: bool,
}

// ============================================================================
// Orchestration Result
// ============================================================================

/// Outcome of one orchestrated call.
///
/// Constructed once per call. `was_fallback` lets callers warn about
/// degraded service without failing the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// Whether a provider produced data.
    pub success: bool,
    /// Data on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ProviderData>,
    /// Provider that produced the data, or the requested provider on failure.
    pub provider_id: ProviderId,
    /// True when the data came from a fallback candidate.
    pub was_fallback: bool,
    /// Last failure, when no candidate succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
    /// Candidates that failed before the outcome was decided, in order.
    #[serde(default)]
    pub failures: Vec<CandidateFailure>,
    /// Wall-clock time spent on the whole chain.
    pub latency_ms: u64,
    /// When the outcome was produced.
    pub completed_at: DateTime<Utc>,
}

impl OrchestrationResult {
    /// Creates a successful outcome.
    pub fn success(
        provider_id: ProviderId,
        was_fallback: bool,
        data: ProviderData,
        failures: Vec<CandidateFailure>,
        latency_ms: u64,
    ) -> Self {
        Self {
            success: true,
            data: Some(data),
            provider_id,
            was_fallback,
            error: None,
            failures,
            latency_ms,
            completed_at: Utc::now(),
        }
    }

    /// Creates a failed outcome.
    pub fn failure(
        provider_id: ProviderId,
        error: ErrorSummary,
        failures: Vec<CandidateFailure>,
        latency_ms: u64,
    ) -> Self {
        Self {
            success: false,
            data: None,
            provider_id,
            was_fallback: false,
            error: Some(error),
            failures,
            latency_ms,
            completed_at: Utc::now(),
        }
    }

    /// Returns true if the call succeeded through a fallback provider.
    pub fn is_degraded(&self) -> bool {
        self.success && self.was_fallback
    }
}

// ============================================================================
// Provider Health
// ============================================================================

/// Cheap, non-network availability status of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderHealth {
    /// Whether the provider can be invoked right now.
    pub available: bool,
    /// Why it is unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProviderHealth {
    /// Available provider.
    pub fn available() -> Self {
        Self {
            available: true,
            reason: None,
        }
    }

    /// Unavailable provider with a reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason.into()),
        }
    }
}
