//! wttr.in provider.
//!
//! Keyless weather in JSON (`format=j1`). The place is a path segment.

pub(crate) mod parser;

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{Category, Priority, ProviderData};
use switchyard_fetch::{RequestContext, TransportError};
use url::Url;

use crate::descriptor::ProviderDescriptor;
use crate::error::ProviderError;
use crate::provider::{InvokeContext, InvokeOptions, Provider};
use crate::query::extract_location;

pub use parser::parse_wttr_response;

/// wttr.in base URL.
pub const WTTR_URL: &str = "https://wttr.in";

/// wttr.in provider.
#[derive(Debug, Clone)]
pub struct WttrProvider {
    base_url: String,
}

impl WttrProvider {
    /// Creates a provider for the public endpoint.
    pub fn new() -> Self {
        Self::with_base_url(WTTR_URL)
    }

    /// Creates a provider for a custom endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, location: &str) -> Result<String, ProviderError> {
        let invalid =
            |e: String| TransportError::InvalidRequest(format!("bad URL {}: {e}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .push(location);
        url.query_pairs_mut().append_pair("format", "j1");
        Ok(url.into())
    }
}

impl Default for WttrProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for WttrProvider {
    async fn invoke(
        &self,
        query: &str,
        options: &InvokeOptions,
        ctx: &InvokeContext<'_>,
    ) -> Result<ProviderData, ProviderError> {
        let location = extract_location(query)?;
        let url = self.url_for(&location)?;
        let body = ctx.fetch(options.apply(RequestContext::get(url))).await?;
        parse_wttr_response(&body)
    }
}

/// Creates the wttr.in descriptor.
pub fn wttr_descriptor() -> ProviderDescriptor {
    descriptor(WttrProvider::new())
}

fn descriptor(provider: WttrProvider) -> ProviderDescriptor {
    ProviderDescriptor::builder("wttr", Arc::new(provider))
        .display_name("wttr.in")
        .category(Category::Weather)
        .priority(Priority::Low)
        .homepage("https://wttr.in")
        .probe_query("weather in London")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{http_transport, invoke};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_location_is_a_path_segment() {
        let provider = WttrProvider::new();
        assert_eq!(
            provider.url_for("New York").unwrap(),
            "https://wttr.in/New%20York?format=j1"
        );
    }

    #[tokio::test]
    async fn test_wttr_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Paris"))
            .and(query_param("format", "j1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current_condition": [{
                    "temp_C": "14", "FeelsLikeC": "13", "humidity": "70",
                    "windspeedKmph": "11", "weatherDesc": [{ "value": "Partly cloudy" }]
                }],
                "nearest_area": [{
                    "areaName": [{ "value": "Paris" }], "country": [{ "value": "France" }]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let desc = descriptor(WttrProvider::with_base_url(server.uri()));
        let transport = http_transport(&[]);
        let data = invoke(&desc, &transport, "weather in Paris").await.unwrap();
        assert_eq!(
            data.summary.as_deref(),
            Some("Paris, France: Partly cloudy, 14°C (feels like 13°C), humidity 70%, wind 11 km/h")
        );
    }
}
