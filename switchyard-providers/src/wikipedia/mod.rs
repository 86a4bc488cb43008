//! Wikipedia provider.
//!
//! Keyless full-text search over English Wikipedia via the MediaWiki
//! action API.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::RequestContext;

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_wikipedia_response;

/// MediaWiki action API endpoint.
pub const WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Wikipedia provider.
#[derive(Debug, Clone)]
pub struct WikipediaProvider {
    base_url: String,
}

impl WikipediaProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(WIKIPEDIA_API_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for WikipediaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for WikipediaProvider {
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
                ("action", "query"),
                ("list", "search"),
                ("format", "json"),
                ("utf8", "1"),
                ("srsearch", query),
                ("srlimit", &options.limit_param()),
            ],
        )?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_wikipedia_response(&body, options.limit)
    }
}

/// Creates the Wikipedia descriptor.
pub fn wikipedia_descriptor() -> ProviderDescriptor {
    descriptor(WikipediaProvider::new())
}

fn descriptor(provider: WikipediaProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("wikipedia", Arc::new(provider))
        .display_name("Wikipedia")
        .category(Category::General)
        .priority(Priority::High)
        .fallback(["duckduckgo"])
        .homepage("https://www.mediawiki.org/wiki/API:Search")
        .build()
}
