//! Provider, registry and orchestration error types.

use switchyard_core::{CandidateFailure, Category, ErrorSummary, ProviderId};
use switchyard_fetch::TransportError;
use thiserror::Error;

// ============================================================================
// Provider Error
// ============================================================================

/// Failure of a single provider invocation.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The transport failed (after its own retries).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The provider answered 2xx with an error payload.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The response was well-formed but contained nothing usable.
    #[error("No results")]
    EmptyResult,

    /// The query cannot be expressed for this provider.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl ProviderError {
    /// Returns true if the caller cancelled the call.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }

    /// Flattens the error for results and logs.
    pub fn to_summary(&self) -> ErrorSummary {
        match self {
            Self::Transport(err) => err.to_summary(),
            Self::Parse(_) => ErrorSummary::new("provider.parse", self.to_string()),
            Self::Upstream(_) => ErrorSummary::new("provider.upstream", self.to_string()),
            Self::EmptyResult => ErrorSummary::new("provider.empty_result", self.to_string()),
            Self::InvalidQuery(_) => ErrorSummary::new("provider.invalid_query", self.to_string()),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

// ============================================================================
// Registry Error
// ============================================================================

/// Configuration error in the provider catalog or routing table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// An id was referenced that is not registered.
    #[error("Unknown provider: {0}")]
    NotFound(ProviderId),

    /// Two descriptors share an id.
    #[error("Duplicate provider id: {0}")]
    Duplicate(ProviderId),

    /// A fallback chain names an unknown provider.
    #[error("Provider {provider} lists unknown fallback {missing}")]
    UnknownFallback {
        /// Provider whose chain is broken.
        provider: ProviderId,
        /// Unknown id in the chain.
        missing: ProviderId,
    },

    /// A fallback chain leads back to its own provider.
    #[error("Cyclic fallback chain: {}", format_path(.path))]
    CyclicFallback {
        /// Ids along the cycle, starting and ending at the same provider.
        path: Vec<ProviderId>,
    },

    /// The routing table could not be parsed.
    #[error("Invalid routing table: {0}")]
    Routing(String),
}

fn format_path(path: &[ProviderId]) -> String {
    path.iter()
        .map(ProviderId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

// ============================================================================
// Orchestration Error
// ============================================================================

/// Terminal failure of an orchestrated call.
#[derive(Debug, Clone, Error)]
pub enum OrchestrationError {
    /// Registry or routing misconfiguration. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(#[from] RegistryError),

    /// Every candidate in the chain failed.
    #[error("All providers failed for {provider_id}; last error: {last_error}")]
    AllProvidersFailed {
        /// The requested (primary) provider.
        provider_id: ProviderId,
        /// The last candidate's failure.
        last_error: ProviderError,
        /// Every candidate failure in order.
        failures: Vec<CandidateFailure>,
    },

    /// Nothing is configured for the intent.
    #[error("No available provider for intent {intent}")]
    NoAvailableProvider {
        /// The classified intent.
        intent: Category,
    },

    /// The caller cancelled the call.
    #[error("Cancelled")]
    Cancelled,
}

impl OrchestrationError {
    /// Stable machine code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "orchestration.configuration",
            Self::AllProvidersFailed { .. } => "orchestration.all_providers_failed",
            Self::NoAvailableProvider { .. } => "orchestration.no_available_provider",
            Self::Cancelled => "orchestration.cancelled",
        }
    }
}
