//! Provider descriptor system.
//!
//! A descriptor is the immutable registry entry for a provider:
//! - Metadata (display name, category, priority, homepage)
//! - Credential requirements and auth shape
//! - Advisory quota
//! - Fallback chain
//! - The [`Provider`] handler

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use switchyard_core::{Category, Priority, ProviderId};
use switchyard_fetch::AuthConfig;

use crate::provider::Provider;

/// Query used by live probes when none is given.
const DEFAULT_PROBE_QUERY: &str = "rust programming language";

// ============================================================================
// Provider Descriptor
// ============================================================================

/// Complete registry entry for a provider.
pub struct ProviderDescriptor {
    /// Unique id.
    pub id: ProviderId,
    /// Human-readable name.
    pub display_name: String,
    /// Category served.
    pub category: Category,
    /// Priority within the category.
    pub priority: Priority,
    /// Whether a credential must be configured.
    pub requires_credential: bool,
    /// Credential name in the store.
    pub credential_type: Option<String>,
    /// Requests per rolling window. Advisory only.
    pub quota_limit: Option<u32>,
    /// Ids tried, in order, after this provider fails.
    pub fallback_chain: Vec<ProviderId>,
    /// How credentials are injected.
    pub auth: AuthConfig,
    /// Provider homepage.
    pub homepage: Option<String>,
    /// Query used by live probes.
    pub probe_query: String,
    provider: Arc<dyn Provider>,
}

impl ProviderDescriptor {
    /// Creates a new descriptor builder.
    pub fn builder(
        id: impl Into<ProviderId>,
        provider: Arc<dyn Provider>,
    ) -> ProviderDescriptorBuilder {
        ProviderDescriptorBuilder::new(id.into(), provider)
    }

    /// Returns the handler.
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Serializable view for listings.
    pub fn info(&self) -> DescriptorInfo {
        DescriptorInfo {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            category: self.category,
            priority: self.priority,
            requires_credential: self.requires_credential,
            credential_type: self.credential_type.clone(),
            quota_limit: self.quota_limit,
            fallback_chain: self.fallback_chain.clone(),
            homepage: self.homepage.clone(),
        }
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .field("requires_credential", &self.requires_credential)
            .field("fallback_chain", &self.fallback_chain)
            .finish_non_exhaustive()
    }
}

/// Metadata-only view of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorInfo {
    /// Unique id.
    pub id: ProviderId,
    /// Human-readable name.
    pub display_name: String,
    /// Category served.
    pub category: Category,
    /// Priority within the category.
    pub priority: Priority,
    /// Whether a credential must be configured.
    pub requires_credential: bool,
    /// Credential name in the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    /// Advisory quota.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota_limit: Option<u32>,
    /// Fallback chain.
    pub fallback_chain: Vec<ProviderId>,
    /// Provider homepage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ProviderDescriptor`].
pub struct ProviderDescriptorBuilder {
    id: ProviderId,
    provider: Arc<dyn Provider>,
    display_name: Option<String>,
    category: Category,
    priority: Priority,
    auth: AuthConfig,
    quota_limit: Option<u32>,
    fallback_chain: Vec<ProviderId>,
    homepage: Option<String>,
    probe_query: Option<String>,
}

impl ProviderDescriptorBuilder {
    /// Creates a new builder for the given provider.
    pub fn new(id: ProviderId, provider: Arc<dyn Provider>) -> Self {
        Self {
            id,
            provider,
            display_name: None,
            category: Category::Search,
            priority: Priority::default(),
            auth: AuthConfig::None,
            quota_limit: None,
            fallback_chain: Vec::new(),
            homepage: None,
            probe_query: None,
        }
    }

    /// Sets the display name.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the auth shape. Any credential-bearing shape marks the
    /// provider as requiring that credential.
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the advisory quota.
    pub fn quota_limit(mut self, limit: u32) -> Self {
        self.quota_limit = Some(limit);
        self
    }

    /// Sets the fallback chain.
    pub fn fallback<I, S>(mut self, chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ProviderId>,
    {
        self.fallback_chain = chain.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the homepage.
    pub fn homepage(mut self, url: impl Into<String>) -> Self {
        self.homepage = Some(url.into());
        self
    }

    /// Sets the live-probe query.
    pub fn probe_query(mut self, query: impl Into<String>) -> Self {
        self.probe_query = Some(query.into());
        self
    }

    /// Builds the descriptor.
    pub fn build(self) -> ProviderDescriptor {
        let credential_type = self.auth.credential_name().map(str::to_string);
        ProviderDescriptor {
            display_name: self.display_name.unwrap_or_else(|| self.id.to_string()),
            id: self.id,
            category: self.category,
            priority: self.priority,
            requires_credential: credential_type.is_some(),
            credential_type,
            quota_limit: self.quota_limit,
            fallback_chain: self.fallback_chain,
            auth: self.auth,
            homepage: self.homepage,
            probe_query: self
                .probe_query
                .unwrap_or_else(|| DEFAULT_PROBE_QUERY.to_string()),
            provider: self.provider,
        }
    }
}
