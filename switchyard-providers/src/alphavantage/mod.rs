//! Alpha Vantage provider.
//!
//! Latest quote via the `GLOBAL_QUOTE` function. The free tier answers
//! throttled requests with HTTP 200 and a `Note`/`Information` message, which
//! is surfaced as an upstream error so the chain can advance.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{AuthConfig, RequestContext};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url};
use crate::query::extract_ticker;

pub use parser::parse_alphavantage_response;

/// Alpha Vantage query endpoint.
pub const ALPHAVANTAGE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage provider.
#[derive(Debug, Clone)]
pub struct AlphaVantageProvider {
    base_url: String,
}

impl AlphaVantageProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(ALPHAVANTAGE_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for AlphaVantageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for AlphaVantageProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let ticker = extract_ticker(query)?;
        let url = build_url(
            &self.base_url,
            &[("function", "GLOBAL_QUOTE"), ("symbol", &ticker)],
        )?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_alphavantage_response(&body)
    }
}

/// Creates the Alpha Vantage descriptor.
pub fn alphavantage_descriptor() -> ProviderDescriptor {
    descriptor(AlphaVantageProvider::new())
}

fn descriptor(provider: AlphaVantageProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("alphavantage", Arc::new(provider))
        .display_name("Alpha Vantage")
        .category(Category::Stocks)
        .priority(Priority::High)
        .auth(AuthConfig::api_key_query("alphavantage", "apikey"))
        .quota_limit(25)
        .fallback(["finnhub"])
        .homepage("https://www.alphavantage.co")
        .probe_query("AAPL stock")
        .build()
}
