//! OMDb provider.
//!
//! Movie title search. The key is the `apikey` query parameter. Failures,
//! including unknown titles, arrive as HTTP 200 with `"Response": "False"`.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{AuthConfig, RequestContext};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url, require_query};

pub use parser::parse_omdb_response;

/// OMDb endpoint.
pub const OMDB_URL: &str = "https://www.omdbapi.com/";

/// OMDb provider.
#[derive(Debug, Clone)]
pub struct OmdbProvider {
    base_url: String,
}

impl OmdbProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(OMDB_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for OmdbProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for OmdbProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let query = require_query(query)?;
        let url = build_url(&self.base_url, &[("s", query), ("type", "movie")])?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_omdb_response(&body, options.limit)
    }
}

/// Creates the OMDb descriptor.
pub fn omdb_descriptor() -> ProviderDescriptor {
    descriptor(OmdbProvider::new())
}

fn descriptor(provider: OmdbProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("omdb", Arc::new(provider))
        .display_name("OMDb")
        .category(Category::Movies)
        .priority(Priority::Medium)
        .auth(AuthConfig::api_key_query("omdb", "apikey"))
        .quota_limit(1000)
        .homepage("https://www.omdbapi.com")
        .probe_query("Inception")
        .build()
}
