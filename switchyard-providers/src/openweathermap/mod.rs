//! OpenWeatherMap provider.
//!
//! Current conditions for a place extracted from the query. The key is the
//! `appid` query parameter; temperatures are requested in metric units.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{AuthConfig, RequestContext};

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider, build_url};
use crate::query::extract_location;

pub use parser::parse_openweathermap_response;

/// Current weather endpoint.
pub const OPENWEATHERMAP_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// OpenWeatherMap provider.
#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    base_url: String,
}

impl OpenWeatherMapProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(OPENWEATHERMAP_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenWeatherMapProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for OpenWeatherMapProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let location = extract_location(query)?;
        let url = build_url(&self.base_url, &[("q", &location), ("units", "metric")])?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_openweathermap_response(&body)
    }
}

/// Creates the OpenWeatherMap descriptor.
pub fn openweathermap_descriptor() -> ProviderDescriptor {
    descriptor(OpenWeatherMapProvider::new())
}

fn descriptor(provider: OpenWeatherMapProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("openweathermap", Arc::new(provider))
        .display_name("OpenWeatherMap")
        .category(Category::Weather)
        .priority(Priority::High)
        .auth(AuthConfig::api_key_query("openweathermap", "appid"))
        .quota_limit(1000)
        .fallback(["wttr"])
        .homepage("https://openweathermap.org/api")
        .probe_query("weather in London")
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
    async fn test_location_and_key_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "Paris"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "w-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Paris",
                "sys": { "country": "FR" },
                "weather": [{ "description": "light rain" }],
                "main": { "temp": 12.4, "feels_like": 11.0, "humidity": 81 },
                "wind": { "speed": 4.1 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let desc = descriptor(OpenWeatherMapProvider::with_base_url(server.uri()));
        let transport = http_transport(&[("openweathermap", "w-key")]);
        let data = invoke(&desc, &transport, "weather in Paris").await.unwrap();
        assert_eq!(
            data.summary.as_deref(),
            Some("Paris, FR: light rain, 12.4°C (feels like 11.0°C), humidity 81%, wind 4.1 m/s")
        );
    }

    #[tokio::test]
    async fn test_query_without_location_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let desc = descriptor(OpenWeatherMapProvider::with_base_url(server.uri()));
        let transport = http_transport(&[("openweathermap", "w-key")]);
        let err = invoke(&desc, &transport, "weather forecast").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidQuery(_)));
    }
}
