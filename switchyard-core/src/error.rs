//! Core error types for Switchyard.

use thiserror::Error;

/// Core error type for Switchyard operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Provider id is empty or contains unsupported characters.
    #[error("Invalid provider id: {0:?}")]
    InvalidProviderId(String),

    /// Category name not in the closed category set.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Priority name not one of high/medium/low.
    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
