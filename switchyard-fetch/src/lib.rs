// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Switchyard Fetch
//!
//! Resilient transport and host APIs for Switchyard.
//!
//! Every provider reaches the network through one [`ResilientTransport`],
//! which adds:
//!
//! - a process-wide minimum-interval [`RateLimiter`]
//! - credential injection per [`AuthConfig`] (header, query parameter, bearer, basic)
//! - per-attempt timeouts
//! - retries with exponential backoff and jitter ([`RetryPolicy`])
//! - cross-origin recovery through a [`ProxyRelay`]
//! - response decoding by content-type sniffing ([`ResponseBody`])
//!
//! ## Host APIs
//!
//! The [`host`] module holds the trait seams the transport depends on:
//!
//! - [`host::http`] - [`HttpExecutor`] and the `reqwest` implementation
//! - [`host::credentials`] - [`CredentialStore`] implementations
//! - [`host::proxy`] - [`ProxyRelay`] and the HTTP relay client
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use switchyard_fetch::{
//!     KeychainCredentialStore, RequestContext, ReqwestExecutor, ResilientTransport,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! let transport = ResilientTransport::builder(
//!     Arc::new(ReqwestExecutor::new("switchyard")?),
//!     Arc::new(KeychainCredentialStore::new()),
//! )
//! .build();
//!
//! let response = transport
//!     .call(RequestContext::get("https://wttr.in/Paris?format=j1"), None, Some("wttr"), &CancellationToken::new())
//!     .await?;
//! ```

pub mod auth;
pub mod body;
pub mod context;
pub mod error;
pub mod host;
pub mod rate_limit;
pub mod retry;
pub mod transport;

// Re-export key types at crate root

// Errors
pub use error::{ErrorKind, RETRYABLE_STATUSES, TransportError};

// Host APIs
pub use host::{
    credentials::{
        CredentialStore, EnvOverlayCredentialStore, KeychainCredentialStore, MemoryCredentialStore,
    },
    http::{HttpExecutor, HttpRequest, HttpResponse, ReqwestExecutor},
    proxy::{HttpProxyRelay, ProxyRelay, ProxyReply, ProxyRequest},
};

// Transport
pub use auth::{AuthConfig, HeaderTemplate};
pub use body::ResponseBody;
pub use context::{HttpMethod, RequestContext, RetryPredicate, TransportSettings};
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use transport::{AttemptResult, ResilientTransport, TransportBuilder, TransportResponse};

// Cancellation token threaded through every call
pub use tokio_util::sync::CancellationToken;
