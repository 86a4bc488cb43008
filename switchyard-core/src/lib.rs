// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Switchyard Core
//!
//! Core types, models, and intent classification for Switchyard.
//!
//! This crate provides the foundational abstractions used across all other
//! Switchyard crates, including:
//!
//! - Domain models (provider ids, categories, normalized result data)
//! - Orchestration outcome and health types
//! - The keyword-scoring intent classifier
//! - Error types
//!
//! ## Key Types
//!
//! ### Provider Types
//! - [`ProviderId`] - Registry key of a provider
//! - [`Category`] - Closed set of query categories
//! - [`Priority`] - Ordinal provider priority (lower sorts first)
//!
//! ### Result Types
//! - [`ProviderData`] - Normalized provider response
//! - [`OrchestrationResult`] - Outcome of one orchestrated call
//! - [`ProviderHealth`] - Cheap availability status
//!
//! ### Classification
//! - [`IntentClassifier`] - Maps free text to a ranked [`Category`]

pub mod error;
pub mod intent;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export classifier types
pub use intent::{IntentClassifier, IntentResult, IntentRule, IntentScore};

// Re-export all model types
pub use models::{
    // Provider types
    Category,
    Priority,
    ProviderId,
    // Result data
    ProviderData,
    ResultItem,
    // Outcomes
    CandidateFailure,
    ErrorSummary,
    OrchestrationResult,
    ProviderHealth,
};
