//! Proxy relay used after an origin/access-policy block.
//!
//! The relay is a trusted intermediary that is not subject to the caller's
//! access restrictions. It receives the identical request as JSON and
//! answers with `{ "data": ... }` or `{ "error": ... }`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::context::HttpMethod;
use crate::error::TransportError;
use crate::host::http::HttpRequest;

// ============================================================================
// Messages
// ============================================================================

/// Request forwarded to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRequest {
    /// URL the caller wanted to reach.
    pub original_url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Headers, auth included.
    pub headers: Vec<(String, String)>,
    /// Body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Time budget the relay should honor.
    pub timeout_ms: u64,
}

impl ProxyRequest {
    /// Builds the relay message for a resolved request.
    pub fn from_request(request: &HttpRequest, timeout_ms: u64) -> Self {
        Self {
            original_url: request.url.clone(),
            method: request.method,
            headers: request.headers.clone(),
            body: request.body.clone(),
            timeout_ms,
        }
    }
}

/// Relay answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyReply {
    /// Upstream payload.
    #[serde(default)]
    pub data: Option<Value>,
    /// Upstream failure.
    #[serde(default)]
    pub error: Option<String>,
    /// Upstream status, when the failure was an HTTP status.
    #[serde(default)]
    pub status: Option<u16>,
}

impl ProxyReply {
    /// Converts the reply into data or a transport error.
    ///
    /// # Errors
    ///
    /// An `error` reply becomes [`TransportError::HttpStatus`] when it carries
    /// a status, otherwise [`TransportError::Network`]. A reply with neither
    /// field is a [`TransportError::ProxyUnavailable`].
    pub fn into_result(self) -> Result<Value, TransportError> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(match self.status {
                Some(status) => TransportError::http_status(status, error),
                None => TransportError::Network(error),
            }),
            (Some(data), None) => Ok(data),
            (None, None) => Err(TransportError::ProxyUnavailable(
                "relay reply carried neither data nor error".to_string(),
            )),
        }
    }
}

// ============================================================================
// Relay Trait
// ============================================================================

/// Forwards a request through a less-restricted intermediary.
#[async_trait]
pub trait ProxyRelay: Send + Sync {
    /// Sends the request and waits for the reply.
    async fn relay(&self, request: ProxyRequest) -> Result<ProxyReply, TransportError>;
}

// ============================================================================
// HTTP Relay
// ============================================================================

/// Relay reached by a JSON `POST` to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpProxyRelay {
    client: Client,
    endpoint: String,
}

impl HttpProxyRelay {
    /// Creates a relay client for `endpoint`.
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProxyRelay for HttpProxyRelay {
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint))]
    async fn relay(&self, request: ProxyRequest) -> Result<ProxyReply, TransportError> {
        debug!(method = %request.method, "Forwarding request to relay");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::ProxyUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::ProxyUnavailable(format!(
                "relay answered HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<ProxyReply>()
            .await
            .map_err(|e| TransportError::ProxyUnavailable(format!("malformed relay reply: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ProxyRequest {
        ProxyRequest {
            original_url: "https://api.example.com/items".into(),
            method: HttpMethod::Get,
            headers: vec![("X-Api-Key".into(), "k".into())],
            body: None,
            timeout_ms: 15_000,
        }
    }

    #[tokio::test]
    async fn test_relay_posts_original_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "original_url": "https://api.example.com/items",
                "method": "GET",
                "timeout_ms": 15000
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "n": 1 } })))
            .expect(1)
            .mount(&server)
            .await;

        let relay = HttpProxyRelay::new(Client::new(), server.uri());
        let reply = relay.relay(request()).await.unwrap();
        assert_eq!(reply.into_result().unwrap(), json!({ "n": 1 }));
    }

    #[tokio::test]
    async fn test_unreachable_relay() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let relay = HttpProxyRelay::new(Client::new(), format!("http://127.0.0.1:{port}/"));
        let err = relay.relay(request()).await.unwrap_err();
        assert!(matches!(err, TransportError::ProxyUnavailable(_)), "{err:?}");
        assert!(!err.to_string().contains("relay answered HTTP"), "{err}");
    }

    #[tokio::test]
    async fn test_relay_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let relay = HttpProxyRelay::new(Client::new(), server.uri());
        let err = relay.relay(request()).await.unwrap_err();
        assert!(err.to_string().contains("relay answered HTTP 502"), "{err}");
    }

    #[test]
    fn test_reply_conversion() {
        let failed = ProxyReply {
            data: None,
            error: Some("Too Many Requests".into()),
            status: Some(429),
        };
        assert_eq!(failed.into_result().unwrap_err().status(), Some(429));

        let network = ProxyReply {
            error: Some("reset".into()),
            ..ProxyReply::default()
        };
        assert!(matches!(network.into_result(), Err(TransportError::Network(_))));

        assert!(matches!(
            ProxyReply::default().into_result(),
            Err(TransportError::ProxyUnavailable(_))
        ));
    }
}
