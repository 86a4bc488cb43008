//! Provider-related types.
//!
//! This module contains the identifiers shared by every layer:
//! - [`ProviderId`] - Registry key of a provider
//! - [`Category`] - Closed set of query categories
//! - [`Priority`] - Ordinal provider priority

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Provider Id
// ============================================================================

/// Unique registry key of a provider (e.g. `brave`, `openweathermap`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates a provider id without validation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a user-supplied provider id.
    ///
    /// Ids are lowercase ASCII letters, digits, `-` and `_`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProviderId`] for empty ids or ids with
    /// other characters.
    pub fn parse(id: &str) -> Result<Self, CoreError> {
        let trimmed = id.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CoreError::InvalidProviderId(id.to_string()))
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ProviderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ProviderId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProviderId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// Category
// ============================================================================

/// Coarse query category shared by providers and the intent classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Web search.
    Search,
    /// News articles.
    News,
    /// Current weather.
    Weather,
    /// Stock quotes.
    Stocks,
    /// Movie lookups.
    Movies,
    /// Code repositories and developer news.
    Tech,
    /// General reference (encyclopedia).
    General,
}

impl Category {
    /// Returns all categories in declaration order.
    pub fn all() -> &'static [Category] {
        &[
            Self::Search,
            Self::News,
            Self::Weather,
            Self::Stocks,
            Self::Movies,
            Self::Tech,
            Self::General,
        ]
    }

    /// Returns the lowercase name used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::News => "news",
            Self::Weather => "weather",
            Self::Stocks => "stocks",
            Self::Movies => "movies",
            Self::Tech => "tech",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

// ============================================================================
// Priority
// ============================================================================

/// Provider priority. Lower rank sorts first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Rank 1.
    High = 1,
    /// Rank 2.
    #[default]
    Medium = 2,
    /// Rank 3.
    Low = 3,
}

impl Priority {
    /// Returns the ordinal rank (high=1, medium=2, low=3).
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Returns the lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "1" => Ok(Self::High),
            "medium" | "2" => Ok(Self::Medium),
            "low" | "3" => Ok(Self::Low),
            _ => Err(CoreError::UnknownPriority(s.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
