//! Per-provider authentication injection.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::context::RequestContext;
use crate::error::TransportError;
use crate::host::credentials::CredentialStore;

/// Placeholder substituted with the credential in header formats.
pub const CREDENTIAL_PLACEHOLDER: &str = "{credential}";

// ============================================================================
// Header Template
// ============================================================================

/// Header name plus a value format containing [`CREDENTIAL_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderTemplate {
    /// Header name.
    pub name: String,
    /// Value format, e.g. `Bearer {credential}`.
    pub format: String,
}

impl HeaderTemplate {
    /// Creates a template.
    pub fn new(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: format.into(),
        }
    }

    /// Header carrying the bare credential.
    pub fn raw(name: impl Into<String>) -> Self {
        Self::new(name, CREDENTIAL_PLACEHOLDER)
    }

    /// `Authorization: Bearer {credential}`.
    pub fn bearer() -> Self {
        Self::new("Authorization", "Bearer {credential}")
    }

    /// Substitutes the credential into the format.
    pub fn render(&self, credential: &str) -> String {
        self.format.replacen(CREDENTIAL_PLACEHOLDER, credential, 1)
    }
}

// ============================================================================
// Auth Config
// ============================================================================

/// Authentication shape of a provider. Read-only at call time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication.
    #[default]
    None,
    /// API key in a header, a query parameter, or both.
    ApiKey {
        /// Credential name in the store.
        credential_key: String,
        /// Header to inject.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header: Option<HeaderTemplate>,
        /// Query parameter to inject.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query_param: Option<String>,
    },
    /// OAuth2 access token.
    #[serde(rename = "oauth2")]
    OAuth2 {
        /// Token name in the store.
        token_key: String,
        /// Header carrying the token.
        header: HeaderTemplate,
    },
    /// HTTP basic auth; the stored credential is `user:password`.
    Basic {
        /// Credential name in the store.
        credential_key: String,
    },
}

impl AuthConfig {
    /// API key sent as a bare header value.
    pub fn api_key_header(credential_key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::ApiKey {
            credential_key: credential_key.into(),
            header: Some(HeaderTemplate::raw(header)),
            query_param: None,
        }
    }

    /// API key sent as a query parameter.
    pub fn api_key_query(credential_key: impl Into<String>, param: impl Into<String>) -> Self {
        Self::ApiKey {
            credential_key: credential_key.into(),
            header: None,
            query_param: Some(param.into()),
        }
    }

    /// OAuth2 bearer token.
    pub fn bearer(token_key: impl Into<String>) -> Self {
        Self::OAuth2 {
            token_key: token_key.into(),
            header: HeaderTemplate::bearer(),
        }
    }

    /// HTTP basic auth.
    pub fn basic(credential_key: impl Into<String>) -> Self {
        Self::Basic {
            credential_key: credential_key.into(),
        }
    }

    /// Returns true for [`AuthConfig::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Name of the credential this config reads.
    pub fn credential_name(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::ApiKey { credential_key, .. } | Self::Basic { credential_key } => {
                Some(credential_key.as_str())
            }
            Self::OAuth2 { token_key, .. } => Some(token_key.as_str()),
        }
    }

    /// Resolves the credential and injects it into `ctx`.
    ///
    /// # Errors
    ///
    /// [`TransportError::Authentication`] if the credential is absent, before
    /// any network traffic. [`TransportError::InvalidRequest`] if a query
    /// parameter cannot be added to the URL.
    pub async fn apply(
        &self,
        ctx: &mut RequestContext,
        store: &dyn CredentialStore,
    ) -> Result<(), TransportError> {
        let Some(name) = self.credential_name() else {
            return Ok(());
        };

        let secret = store
            .get(name)
            .await
            .filter(|s| !s.is_empty())
            .ok_or_else(|| TransportError::Authentication {
                credential: name.to_string(),
            })?;

        match self {
            Self::None => {}
            Self::ApiKey {
                header,
                query_param,
                ..
            } => {
                if let Some(template) = header {
                    ctx.set_header(template.name.clone(), template.render(&secret));
                }
                if let Some(param) = query_param {
                    ctx.url = append_query(&ctx.url, param, &secret)?;
                }
            }
            Self::OAuth2 { header, .. } => {
                ctx.set_header(header.name.clone(), header.render(&secret));
            }
            Self::Basic { .. } => {
                let encoded = STANDARD.encode(secret.as_bytes());
                ctx.set_header("Authorization", format!("Basic {encoded}"));
            }
        }
        Ok(())
    }
}

fn append_query(url: &str, param: &str, value: &str) -> Result<String, TransportError> {
    let mut parsed =
        Url::parse(url).map_err(|e| TransportError::InvalidRequest(format!("{url}: {e}")))?;
    parsed.query_pairs_mut().append_pair(param, value);
    Ok(parsed.into())
}

// ============================================================================
// Tests
// ============================================================================
