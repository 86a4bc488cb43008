//! GitHub repository search provider.
//!
//! Keyless (unauthenticated search is limited to 10 requests per minute).
//! Results are sorted by stars.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::RequestContext;

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_github_response;

/// Repository search endpoint.
pub const GITHUB_SEARCH_URL: &str = "https://api.github.com/search/repositories";

/// GitHub provider.
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    base_url: String,
}

impl GitHubProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(GITHUB_SEARCH_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for GitHubProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for GitHubProvider {
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
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", &options.limit_param()),
            ],
        )?;
        let request = RequestContext::get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        let body = ctx.fetch(options.apply(request)).await?;
        parse_github_response(&body, options.limit)
    }
}

/// Creates the GitHub descriptor.
pub fn github_descriptor() -> ProviderDescriptor {
    descriptor(GitHubProvider::new())
}

fn descriptor(provider: GitHubProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("github", Arc::new(provider))
        .display_name("GitHub")
        .category(Category::Tech)
        .priority(Priority::High)
        .quota_limit(10)
        .fallback(["hackernews"])
        .homepage("https://docs.github.com/en/rest/search")
        .probe_query("tokio")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{http_transport, invoke};
    use serde_json::json;
    use switchyard_fetch::TransportError;
    use wiremock::matchers::{header, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_github_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("sort", "stars"))
            .and(header("Accept", "application/vnd.github+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "items": [{
                    "full_name": "tokio-rs/tokio",
                    "html_url": "https://github.com/tokio-rs/tokio",
                    "description": "A runtime for writing reliable asynchronous applications with Rust.",
                    "stargazers_count": 27000,
                    "language": "Rust"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let desc = descriptor(GitHubProvider::with_base_url(server.uri()));
        let transport = http_transport(&[]);
        let data = invoke(&desc, &transport, "tokio").await.unwrap();
        assert_eq!(data.items[0].title, "tokio-rs/tokio");
        assert!(data.items[0].snippet.as_deref().unwrap().starts_with("★ 27000 · Rust · "));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "API rate limit exceeded"
            })))
            .mount(&server)
            .await;

        let desc = descriptor(GitHubProvider::with_base_url(server.uri()));
        let transport = http_transport(&[]);
        let err = invoke(&desc, &transport, "tokio").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Transport(TransportError::HttpStatus { status: 403, .. })
        ));
    }
}
