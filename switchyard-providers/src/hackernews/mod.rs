//! Hacker News provider.
//!
//! Keyless story search through the Algolia HN API.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::RequestContext;

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_hackernews_response;

/// Algolia HN search endpoint.
pub const HACKERNEWS_SEARCH_URL: &str = "https://hn.algolia.com/api/v1/search";

/// Hacker News provider.
#[derive(Debug, Clone)]
pub struct HackerNewsProvider {
    base_url: String,
}

impl HackerNewsProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(HACKERNEWS_SEARCH_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for HackerNewsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for HackerNewsProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let query = require_query(query)?;
        let url = build_url(
            &self.base_url,
            &[("query", query), ("tags", "story"), ("hitsPerPage", &options.limit_param())],
        )?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_hackernews_response(&body, options.limit)
    }
}

/// Creates the Hacker News descriptor.
pub fn hackernews_descriptor() -> ProviderDescriptor {
    descriptor(HackerNewsProvider::new())
}

pub(crate) fn descriptor(provider: HackerNewsProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("hackernews", Arc::new(provider))
        .display_name("Hacker News")
        .category(Category::Tech)
        .priority(Priority::Medium)
        .homepage("https://hn.algolia.com/api")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{http_transport, invoke};
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_story_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("tags", "story"))
            .and(query_param("query", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": [
                    { "objectID": "1", "title": "Rust 1.80", "url": "https://blog.rust-lang.org", "points": 500, "num_comments": 120, "author": "steveklabnik" },
                    { "objectID": "2", "title": "Ask HN: Rust jobs?", "url": null, "points": 12, "num_comments": 3, "author": "pg" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let desc = descriptor(HackerNewsProvider::with_base_url(server.uri()));
        let transport = http_transport(&[]);
        let data = invoke(&desc, &transport, "rust").await.unwrap();
        assert_eq!(data.items.len(), 2);
        assert_eq!(
            data.items[1].url.as_deref(),
            Some("https://news.ycombinator.com/item?id=2")
        );
    }
}
