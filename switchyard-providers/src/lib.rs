// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Switchyard Providers
//!
//! Concrete data providers and the orchestration engine that picks between
//! them.
//!
//! Each provider module contains:
//!
//! - **Provider**: a [`Provider`] implementation holding its endpoint
//! - **Descriptor**: static metadata (category, priority, auth, fallbacks)
//! - **Parser**: normalization of the upstream payload into [`ProviderData`]
//!
//! ## Built-in Providers (14 total)
//!
//! | Provider | Category | Priority | Key | Fallbacks |
//! |----------|----------|----------|-----|-----------|
//! | Brave Search | search | high | ✅ | serpapi, duckduckgo |
//! | SerpApi | search | medium | ✅ | duckduckgo |
//! | DuckDuckGo | search | low | ❌ | |
//! | NewsAPI | news | high | ✅ | gnews |
//! | GNews | news | medium | ✅ | hackernews |
//! | OpenWeatherMap | weather | high | ✅ | wttr |
//! | wttr.in | weather | low | ❌ | |
//! | Alpha Vantage | stocks | high | ✅ | finnhub |
//! | Finnhub | stocks | medium | ✅ | |
//! | TMDB | movies | high | ✅ | omdb |
//! | OMDb | movies | medium | ✅ | |
//! | GitHub | tech | high | ❌ | hackernews |
//! | Hacker News | tech | medium | ❌ | |
//! | Wikipedia | general | high | ❌ | duckduckgo |
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use switchyard_fetch::{CancellationToken, MemoryCredentialStore, ReqwestExecutor, ResilientTransport};
//! use switchyard_providers::{ExecuteOptions, Orchestrator};
//!
//! let transport = ResilientTransport::builder(
//!     Arc::new(ReqwestExecutor::new("switchyard")?),
//!     Arc::new(MemoryCredentialStore::new()),
//! )
//! .build();
//! let orchestrator = Orchestrator::builtin(Arc::new(transport))?;
//!
//! let results = orchestrator
//!     .execute_for_intent("weather in Paris", &ExecuteOptions::single(), &CancellationToken::new())
//!     .await?;
//! ```
//!
//! [`ProviderData`]: switchyard_core::ProviderData

pub mod descriptor;
pub mod error;
pub mod health;
pub mod orchestrator;
pub mod provider;
pub mod query;
pub mod registry;
pub mod routing;

// Provider modules (alphabetical)
pub mod alphavantage;
pub mod brave;
pub mod duckduckgo;
pub mod finnhub;
pub mod github;
pub mod gnews;
pub mod hackernews;
pub mod newsapi;
pub mod omdb;
pub mod openweathermap;
pub mod serpapi;
pub mod tmdb;
pub mod wikipedia;
pub mod wttr;

// Re-export key types
pub use descriptor::{DescriptorInfo, ProviderDescriptor, ProviderDescriptorBuilder};
pub use error::{OrchestrationError, ProviderError, RegistryError};
pub use health::{HealthProber, LiveProbe};
pub use orchestrator::{
    DEFAULT_MAX_PROVIDERS, DEFAULT_MULTI_PROVIDER_CONFIDENCE, ExecuteOptions, Orchestrator,
    OrchestratorSettings,
};
pub use provider::{DEFAULT_LIMIT, InvokeContext, InvokeOptions, Provider};
pub use registry::{ProviderRegistry, builtin_descriptors};
pub use routing::{IntentRoute, RoutingTable};

// Re-export provider descriptors
pub use alphavantage::alphavantage_descriptor;
pub use brave::brave_descriptor;
pub use duckduckgo::duckduckgo_descriptor;
pub use finnhub::finnhub_descriptor;
pub use github::github_descriptor;
pub use gnews::gnews_descriptor;
pub use hackernews::hackernews_descriptor;
pub use newsapi::newsapi_descriptor;
pub use omdb::omdb_descriptor;
pub use openweathermap::openweathermap_descriptor;
pub use serpapi::serpapi_descriptor;
pub use tmdb::tmdb_descriptor;
pub use wikipedia::wikipedia_descriptor;
pub use wttr::wttr_descriptor;

// Re-export provider types for convenience
pub use alphavantage::AlphaVantageProvider;
pub use brave::BraveProvider;
pub use duckduckgo::DuckDuckGoProvider;
pub use finnhub::FinnhubProvider;
pub use github::GitHubProvider;
pub use gnews::GNewsProvider;
pub use hackernews::HackerNewsProvider;
pub use newsapi::NewsApiProvider;
pub use omdb::OmdbProvider;
pub use openweathermap::OpenWeatherMapProvider;
pub use serpapi::SerpApiProvider;
pub use tmdb::TmdbProvider;
pub use wikipedia::WikipediaProvider;
pub use wttr::WttrProvider;

#[cfg(test)]
mod testing;
