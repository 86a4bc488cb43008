//! SerpApi provider.
//!
//! Google results through SerpApi. The key travels as the `api_key` query
//! parameter. SerpApi reports quota and key problems as a 200 response with
//! an `error` field.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{AuthConfig, RequestContext};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_serpapi_response;

/// SerpApi search endpoint.
pub const SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// SerpApi (Google engine) provider.
#[derive(Debug, Clone)]
pub struct SerpApiProvider {
    base_url: String,
}

impl SerpApiProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(SERPAPI_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for SerpApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for SerpApiProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let query = require_query(query)?;
        let url = build_url(
            &self.base_url,
            &[("engine", "google"), ("q", query), ("num", &options.limit_param())],
        )?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_serpapi_response(&body, options.limit)
    }
}

/// Creates the SerpApi descriptor.
pub fn serpapi_descriptor() -> ProviderDescriptor {
    descriptor(SerpApiProvider::new())
}

fn descriptor(provider: SerpApiProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("serpapi", Arc::new(provider))
        .display_name("SerpApi")
        .category(Category::Search)
        .priority(Priority::Medium)
        .auth(AuthConfig::api_key_query("serpapi", "api_key"))
        .quota_limit(100)
        .fallback(["duckduckgo"])
        .homepage("https://serpapi.com")
        .build()
}
