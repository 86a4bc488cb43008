//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use switchyard_core::{CandidateFailure, OrchestrationResult};
use switchyard_providers::{DescriptorInfo, OrchestrationError};

// ============================================================================
// Output Types
// ============================================================================

/// A registered provider and whether it can run.
#[derive(Debug, Serialize)]
pub struct ProviderOutput {
    /// Descriptor metadata.
    #[serde(flatten)]
    pub info: DescriptorInfo,
    /// Credential requirement met.
    pub available: bool,
}

/// A terminal orchestration error.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    /// Always false, so result and error objects share the field.
    pub success: bool,
    /// Stable machine code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Candidate failures, for exhausted chains.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<CandidateFailure>,
}

impl ErrorOutput {
    /// Converts an orchestration error.
    pub fn new(err: &OrchestrationError) -> Self {
        let failures = match err {
            OrchestrationError::AllProvidersFailed { failures, .. } => failures.clone(),
            _ => Vec::new(),
        };
        Self {
            success: false,
            code: err.code(),
            message: err.to_string(),
            failures,
        }
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats orchestration results. A single result is an object,
    /// several are an array.
    pub fn format_results(&self, results: &[OrchestrationResult]) -> Result<String> {
        match results {
            [single] => self.format(single),
            many => self.format(many),
        }
    }

    /// Formats a terminal orchestration error.
    pub fn format_error(&self, err: &OrchestrationError) -> Result<String> {
        self.format(&ErrorOutput::new(err))
    }
}
