//! The Movie Database (TMDB) provider.
//!
//! Movie search with a v4 read-access token sent as an OAuth2 bearer token.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{AuthConfig, RequestContext};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_tmdb_response;

/// TMDB movie search endpoint.
pub const TMDB_SEARCH_URL: &str = "https://api.themoviedb.org/3/search/movie";

/// TMDB provider.
#[derive(Debug, Clone)]
pub struct TmdbProvider {
    base_url: String,
}

impl TmdbProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(TMDB_SEARCH_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for TmdbProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for TmdbProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let query = require_query(query)?;
        let url = build_url(
            &self.base_url,
            &[("query", query), ("include_adult", "false"), ("language", "en-US")],
        )?;
        let request = options.apply(RequestContext::get(url).header("Accept", "application/json"));
        let body = ctx.fetch(request).await?;
        parse_tmdb_response(&body, options.limit)
    }
}

/// Creates the TMDB descriptor.
pub fn tmdb_descriptor() -> ProviderDescriptor {
    descriptor(TmdbProvider::new())
}

fn descriptor(provider: TmdbProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("tmdb", Arc::new(provider))
        .display_name("The Movie Database")
        .category(Category::Movies)
        .priority(Priority::High)
        .auth(AuthConfig::bearer("tmdb"))
        .fallback(["omdb"])
        .homepage("https://www.themoviedb.org")
        .probe_query("Inception")
        .build()
}
