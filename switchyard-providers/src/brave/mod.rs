//! Brave Search provider.
//!
//! Web search through the Brave Search API. The subscription token is sent
//! in the `X-Subscription-Token` header.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{AuthConfig, RequestContext};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_brave_response;

/// Brave web search endpoint.
pub const BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave Search provider.
#[derive(Debug, Clone)]
pub struct BraveProvider {
    base_url: String,
}

impl BraveProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(BRAVE_API_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for BraveProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for BraveProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let query = require_query(query)?;
        let url = build_url(&self.base_url, &[("q", query), ("count", &options.limit_param())])?;
        let request = options.apply(RequestContext::get(url).header("Accept", "application/json"));
        let body = ctx.fetch(request).await?;
        parse_brave_response(&body, options.limit)
    }
}

/// Creates the Brave Search descriptor.
pub fn brave_descriptor() -> ProviderDescriptor {
    descriptor(BraveProvider::new())
}

fn descriptor(provider: BraveProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("brave", Arc::new(provider))
        .display_name("Brave Search")
        .category(Category::Search)
        .priority(Priority::High)
        .auth(AuthConfig::api_key_header("brave", "X-Subscription-Token"))
        .quota_limit(2000)
        .fallback(["serpapi", "duckduckgo"])
        .homepage("https://brave.com/search/api/")
        .build()
}
