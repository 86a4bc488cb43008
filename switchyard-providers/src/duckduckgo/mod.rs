//! DuckDuckGo Instant Answer provider.
//!
//! Keyless. Returns an abstract plus related topics rather than a ranked
//! result list, so it serves as the last resort for search and general
//! reference queries.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::RequestContext;

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_duckduckgo_response;

/// Instant Answer endpoint.
pub const DUCKDUCKGO_API_URL: &str = "https://api.duckduckgo.com/";

/// DuckDuckGo Instant Answer provider.
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    base_url: String,
}

impl DuckDuckGoProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DUCKDUCKGO_API_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for DuckDuckGoProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let query = require_query(query)?;
        let url = build_url(
            &self.base_url,
            &[("q", query), ("format", "json"), ("no_html", "1"), ("skip_disambig", "1")],
        )?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_duckduckgo_response(&body, options.limit)
    }
}

/// Creates the DuckDuckGo descriptor.
pub fn duckduckgo_descriptor() -> ProviderDescriptor {
    descriptor(DuckDuckGoProvider::new())
}

fn descriptor(provider: DuckDuckGoProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("duckduckgo", Arc::new(provider))
        .display_name("DuckDuckGo")
        .category(Category::Search)
        .priority(Priority::Low)
        .homepage("https://duckduckgo.com/api")
        .probe_query("Rust (programming language)")
        .build()
}
