//! GNews provider.
//!
//! Article search over `gnews.io`. The key is the `apikey` query parameter.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{AuthConfig, RequestContext};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_gnews_response;

/// GNews search endpoint.
pub const GNEWS_API_URL: &str = "https://gnews.io/api/v4/search";

/// GNews provider.
#[derive(Debug, Clone)]
pub struct GNewsProvider {
    base_url: String,
}

impl GNewsProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(GNEWS_API_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for GNewsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for GNewsProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let query = require_query(query)?;
        let url = build_url(
            &self.base_url,
            &[("q", query), ("lang", "en"), ("max", &options.limit_param())],
        )?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_gnews_response(&body, options.limit)
    }
}

/// Creates the GNews descriptor.
pub fn gnews_descriptor() -> ProviderDescriptor {
    descriptor(GNewsProvider::new())
}

fn descriptor(provider: GNewsProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("gnews", Arc::new(provider))
        .display_name("GNews")
        .category(Category::News)
        .priority(Priority::Medium)
        .auth(AuthConfig::api_key_query("gnews", "apikey"))
        .quota_limit(100)
        .fallback(["hackernews"])
        .homepage("https://gnews.io")
        .probe_query("technology")
        .build()
}
