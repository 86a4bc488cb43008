//! Normalized provider response data.

use serde::{Deserialize, Serialize};

/// One entry of a provider response (a search hit, an article, a movie).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Headline or title.
    pub title: String,
    /// Canonical link, when the provider returns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl ResultItem {
    /// Creates an item with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
            snippet: None,
        }
    }

    /// Sets the link.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the snippet, ignoring blank text.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        let snippet = snippet.into();
        if !snippet.trim().is_empty() {
            self.snippet = Some(snippet);
        }
        self
    }
}

/// Provider-independent response shape.
///
/// List-style providers fill `items`; scalar providers (weather, quotes)
/// put a one-line answer in `summary` and may add detail items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderData {
    /// Result entries in provider order.
    #[serde(default)]
    pub items: Vec<ResultItem>,
    /// One-line answer, if the provider has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl ProviderData {
    /// Creates data from a list of items.
    pub fn from_items(items: Vec<ResultItem>) -> Self {
        Self {
            items,
            summary: None,
        }
    }

    /// Creates data holding only a summary line.
    pub fn from_summary(summary: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            summary: Some(summary.into()),
        }
    }

    /// Sets the summary line.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Returns true if there is neither an item nor a summary.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.summary.is_none()
    }
}
