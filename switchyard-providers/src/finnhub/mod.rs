//! Finnhub provider.
//!
//! Real-time quote. The token is sent in the `X-Finnhub-Token` header.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{AuthConfig, RequestContext};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url};
use crate::query::extract_ticker;

pub use parser::parse_finnhub_response;

/// Finnhub quote endpoint.
pub const FINNHUB_URL: &str = "https://finnhub.io/api/v1/quote";

/// Finnhub provider.
#[derive(Debug, Clone)]
pub struct FinnhubProvider {
    base_url: String,
}

impl FinnhubProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(FINNHUB_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for FinnhubProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for FinnhubProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let ticker = extract_ticker(query)?;
        let url = build_url(&self.base_url, &[("symbol", &ticker)])?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_finnhub_response(&ticker, &body)
    }
}

/// Creates the Finnhub descriptor.
pub fn finnhub_descriptor() -> ProviderDescriptor {
    descriptor(FinnhubProvider::new())
}

fn descriptor(provider: FinnhubProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("finnhub", Arc::new(provider))
        .display_name("Finnhub")
        .category(Category::Stocks)
        .priority(Priority::Medium)
        .auth(AuthConfig::api_key_header("finnhub", "X-Finnhub-Token"))
        .quota_limit(60)
        .homepage("https://finnhub.io")
        .probe_query("AAPL stock")
        .build()
}
