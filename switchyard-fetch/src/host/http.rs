//! HTTP execution behind a trait seam.
//!
//! The transport never talks to `reqwest` directly; it hands an
//! [`HttpRequest`] to an [`HttpExecutor`]. Production code uses
//! [`ReqwestExecutor`], tests substitute counting fakes.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use tracing::{debug, instrument};

use crate::context::HttpMethod;
use crate::error::TransportError;

// ============================================================================
// Request / Response
// ============================================================================

/// A fully resolved request (auth already injected).
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Final URL.
    pub url: String,
    /// Headers.
    pub headers: Vec<(String, String)>,
    /// Body.
    pub body: Option<String>,
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("headers", &self.headers.len())
            .field("has_body", &self.body.is_some())
            .finish_non_exhaustive()
    }
}

/// A raw response of any status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// `Content-Type` header.
    pub content_type: Option<String>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as lossy UTF-8.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ============================================================================
// Executor Trait
// ============================================================================

/// Issues one network request.
///
/// Non-2xx statuses are returned as responses, not errors. Errors are
/// reserved for failures where no response arrived.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    /// Executes the request.
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

// ============================================================================
// Reqwest Executor
// ============================================================================

/// [`HttpExecutor`] backed by a shared `reqwest` client.
///
/// Timeouts are enforced by the transport around each attempt, so the
/// client itself carries none.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    inner: Client,
}

impl ReqwestExecutor {
    /// Creates an executor with the given User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the TLS backend cannot
    /// be initialized.
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let inner = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { inner })
    }

    /// Wraps an existing client.
    pub fn with_client(inner: Client) -> Self {
        Self { inner }
    }

    /// The underlying client, shared with the proxy relay.
    pub fn client(&self) -> &Client {
        &self.inner
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn headers(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidRequest(format!("header {name}: {e}")))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

/// Maps a `reqwest` failure onto the transport taxonomy.
fn map_reqwest_error(err: &reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else if err.is_timeout() {
        TransportError::Timeout(std::time::Duration::ZERO)
    } else {
        // Connect, reset, body and decode failures are all network-level.
        TransportError::Network(error_chain(err))
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    #[instrument(skip(self, request), fields(method = %request.method))]
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .inner
            .request(Self::method(request.method), &request.url)
            .headers(Self::headers(&request.headers)?);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| map_reqwest_error(&e))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!(status, "Response received");

        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(&e))?
            .to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// URL of a local port with nothing listening on it.
    fn closed_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/")
    }

    fn get(url: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![("X-Api-Key".into(), "k".into())],
            body: None,
        }
    }

    #[tokio::test]
    async fn test_executes_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "rust"))
            .and(header("X-Api-Key", "k"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"status":"ok"}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let executor = ReqwestExecutor::new("switchyard-test").unwrap();
        let response = executor
            .execute(&get(format!("{}/v2/everything?q=rust", server.uri())))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
        assert_eq!(response.text_lossy(), r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_non_success_is_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let executor = ReqwestExecutor::new("switchyard-test").unwrap();
        let response = executor.execute(&get(server.uri())).await.unwrap();
        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let executor = ReqwestExecutor::new("switchyard-test").unwrap();
        let err = executor.execute(&get(closed_url())).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)), "{err:?}");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = ReqwestExecutor::headers(&[("Bad Header".into(), "v".into())]).unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }
}
