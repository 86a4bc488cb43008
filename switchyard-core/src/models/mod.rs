//! Domain models for Switchyard.
//!
//! ## Submodules
//!
//! - [`provider`] - Identifiers (`ProviderId`, `Category`, `Priority`)
//! - [`data`] - Normalized response data (`ProviderData`, `ResultItem`)
//! - [`outcome`] - Orchestration outcomes and health (`OrchestrationResult`, `ProviderHealth`)

mod data;
mod outcome;
mod provider;

// Re-export everything at the models level
pub use data::{ProviderData, ResultItem};
pub use outcome::{CandidateFailure, ErrorSummary, OrchestrationResult, ProviderHealth};
pub use provider::{Category, Priority, ProviderId};
