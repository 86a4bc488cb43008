//! Intent routing table.
//!
//! Maps each [`Category`] to its classifier keywords and to the primary and
//! fallback provider sets used by intent-based execution. The built-in table
//! is a YAML document compiled into the crate and parsed at startup.

use serde::{Deserialize, Serialize};
use switchyard_core::{Category, IntentClassifier, IntentRule, ProviderId};

use crate::error::RegistryError;
use crate::registry::ProviderRegistry;

const BUILTIN_ROUTING: &str = include_str!("data/routing.yaml");

// ============================================================================
// Routes
// ============================================================================

/// Routing entry for one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRoute {
    /// The intent.
    pub intent: Category,
    /// Classifier keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Providers tried first.
    #[serde(default)]
    pub primary: Vec<ProviderId>,
    /// Providers used when no primary one is available.
    #[serde(default)]
    pub fallback: Vec<ProviderId>,
}

/// Complete routing table, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    intents: Vec<IntentRoute>,
}

impl RoutingTable {
    /// Parses a routing table from YAML.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Routing`] for malformed documents or repeated intents.
    pub fn from_yaml(source: &str) -> Result<Self, RegistryError> {
        let table: Self =
            serde_yaml::from_str(source).map_err(|e| RegistryError::Routing(e.to_string()))?;

        for (i, route) in table.intents.iter().enumerate() {
            if table.intents[..i].iter().any(|r| r.intent == route.intent) {
                return Err(RegistryError::Routing(format!(
                    "intent {} is declared twice",
                    route.intent
                )));
            }
        }
        Ok(table)
    }

    /// The table compiled into the crate.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded document is malformed.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_yaml(BUILTIN_ROUTING)
    }

    /// All routes, in declaration order.
    pub fn routes(&self) -> &[IntentRoute] {
        &self.intents
    }

    /// Route for `intent`, if declared.
    pub fn route(&self, intent: Category) -> Option<&IntentRoute> {
        self.intents.iter().find(|r| r.intent == intent)
    }

    /// Builds the keyword classifier for this table.
    pub fn classifier(&self) -> IntentClassifier {
        IntentClassifier::new(
            self.intents
                .iter()
                .map(|r| IntentRule::new(r.intent, r.keywords.iter().cloned()))
                .collect(),
        )
    }

    /// Checks that every referenced provider is registered.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for the first unknown id.
    pub fn validate(&self, registry: &ProviderRegistry) -> Result<(), RegistryError> {
        self.intents
            .iter()
            .flat_map(|r| r.primary.iter().chain(&r.fallback))
            .find(|id| !registry.contains(id.as_str()))
            .map_or(Ok(()), |id| Err(RegistryError::NotFound(id.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_matches_registry() {
        let table = RoutingTable::builtin().unwrap();
        let registry = ProviderRegistry::builtin().unwrap();
        table.validate(&registry).unwrap();
        assert_eq!(table.routes().len(), Category::all().len());
        assert_eq!(table.routes()[0].intent, Category::Search);
    }

    #[test]
    fn test_route_lookup() {
        let table = RoutingTable::builtin().unwrap();
        let weather = table.route(Category::Weather).unwrap();
        assert_eq!(weather.primary, vec![ProviderId::new("openweathermap")]);
        assert_eq!(weather.fallback, vec![ProviderId::new("wttr")]);
        assert!(table.route(Category::Stocks).unwrap().fallback.is_empty());
    }

    #[test]
    fn test_classifier_from_table() {
        let classifier = RoutingTable::builtin().unwrap().classifier();
        assert_eq!(classifier.classify("latest AI news").intent, Category::News);
        assert_eq!(classifier.classify("weather in Paris").intent, Category::Weather);
        assert_eq!(classifier.classify("AAPL share price").intent, Category::Stocks);
        assert_eq!(classifier.classify("zzzz").intent, Category::Search);
    }

    #[test]
    fn test_validate_rejects_unknown_ids() {
        let table = RoutingTable::from_yaml(
            "intents:\n  - intent: news\n    keywords: [news]\n    primary: [ghost]\n",
        )
        .unwrap();
        let registry = ProviderRegistry::builtin().unwrap();
        assert_eq!(
            table.validate(&registry).unwrap_err(),
            RegistryError::NotFound("ghost".into())
        );
    }

    #[test]
    fn test_malformed_tables() {
        assert!(matches!(
            RoutingTable::from_yaml("intents: [ { intent: nonsense } ]"),
            Err(RegistryError::Routing(_))
        ));
        let twice = "intents:\n  - intent: news\n  - intent: news\n";
        assert!(matches!(
            RoutingTable::from_yaml(twice),
            Err(RegistryError::Routing(_))
        ));
    }
}
