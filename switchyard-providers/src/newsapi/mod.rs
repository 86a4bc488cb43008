//! NewsAPI provider.
//!
//! Article search over `newsapi.org`, newest first. The key is sent in the
//! `X-Api-Key` header.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{AuthConfig, RequestContext};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_newsapi_response;

/// NewsAPI "everything" endpoint.
pub const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";

/// NewsAPI provider.
#[derive(Debug, Clone)]
pub struct NewsApiProvider {
    base_url: String,
}

impl NewsApiProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(NEWSAPI_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for NewsApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for NewsApiProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let query = require_query(query)?;
        let url = build_url(
            &self.base_url,
            &[
                ("q", query),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", &options.limit_param()),
            ],
        )?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_newsapi_response(&body, options.limit)
    }
}

/// Creates the NewsAPI descriptor.
pub fn newsapi_descriptor() -> ProviderDescriptor {
    descriptor(NewsApiProvider::new())
}

fn descriptor(provider: NewsApiProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("newsapi", Arc::new(provider))
        .display_name("NewsAPI")
        .category(Category::News)
        .priority(Priority::High)
        .auth(AuthConfig::api_key_header("newsapi", "X-Api-Key"))
        .quota_limit(100)
        .fallback(["gnews"])
        .homepage("https://newsapi.org")
        .probe_query("technology")
        .build()
}
