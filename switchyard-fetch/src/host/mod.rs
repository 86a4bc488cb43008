//! Host APIs used by the transport.
//!
//! This module provides abstractions for interacting with external systems:
//!
//! - [`http`] - HTTP execution (`reqwest`)
//! - [`credentials`] - Credential stores (system keychain, memory, environment overlay)
//! - [`proxy`] - Proxy relay for origin-blocked requests

pub mod credentials;
pub mod http;
pub mod proxy;

// Re-export key types
pub use credentials::{
    CredentialStore, EnvOverlayCredentialStore, KeychainCredentialStore, MemoryCredentialStore,
};
pub use http::{HttpExecutor, HttpRequest, HttpResponse, ReqwestExecutor};
pub use proxy::{HttpProxyRelay, ProxyRelay, ProxyReply, ProxyRequest};
