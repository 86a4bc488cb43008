//! Provider registry for managing all provider descriptors.
//!
//! The registry is built once at startup and is read-only afterwards.
//! Construction validates the catalog: ids are unique, every fallback id is
//! registered and no fallback chain leads back to its own provider.

use std::collections::{HashMap, HashSet};

use switchyard_core::{Category, ProviderId};
use tracing::debug;

use crate::descriptor::ProviderDescriptor;
use crate::error::RegistryError;
use crate::{
    alphavantage, brave, duckduckgo, finnhub, github, gnews, hackernews, newsapi, omdb,
    openweathermap, serpapi, tmdb, wikipedia, wttr,
};

/// Descriptors for every built-in provider.
///
/// Ordered by category, then by priority inside the category.
pub fn builtin_descriptors() -> Vec<ProviderDescriptor> {
    vec![
        // Search
        brave::brave_descriptor(),
        serpapi::serpapi_descriptor(),
        duckduckgo::duckduckgo_descriptor(),
        // News
        newsapi::newsapi_descriptor(),
        gnews::gnews_descriptor(),
        // Weather
        openweathermap::openweathermap_descriptor(),
        wttr::wttr_descriptor(),
        // Stocks
        alphavantage::alphavantage_descriptor(),
        finnhub::finnhub_descriptor(),
        // Movies
        tmdb::tmdb_descriptor(),
        omdb::omdb_descriptor(),
        // Tech
        github::github_descriptor(),
        hackernews::hackernews_descriptor(),
        // General
        wikipedia::wikipedia_descriptor(),
    ]
}

// ============================================================================
// Provider Registry
// ============================================================================

/// Validated, immutable catalog of providers.
#[derive(Debug)]
pub struct ProviderRegistry {
    descriptors: Vec<ProviderDescriptor>,
    index: HashMap<ProviderId, usize>,
}

impl ProviderRegistry {
    /// Builds a registry from descriptors.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Duplicate`] if two descriptors share an id
    /// - [`RegistryError::UnknownFallback`] if a chain names an unknown id
    /// - [`RegistryError::CyclicFallback`] if a chain reaches its own provider
    pub fn new(descriptors: Vec<ProviderDescriptor>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (position, desc) in descriptors.iter().enumerate() {
            if index.insert(desc.id.clone(), position).is_some() {
                return Err(RegistryError::Duplicate(desc.id.clone()));
            }
        }

        for desc in &descriptors {
            if let Some(missing) = desc
                .fallback_chain
                .iter()
                .find(|id| !index.contains_key(*id))
            {
                return Err(RegistryError::UnknownFallback {
                    provider: desc.id.clone(),
                    missing: missing.clone(),
                });
            }
        }

        let registry = Self { descriptors, index };
        for desc in &registry.descriptors {
            registry.check_acyclic(&desc.id)?;
        }

        debug!(count = registry.descriptors.len(), "Provider registry built");
        Ok(registry)
    }

    /// Builds the registry of built-in providers.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in catalog itself is inconsistent.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(builtin_descriptors())
    }

    /// Depth-first walk of fallback edges starting at `start`.
    fn check_acyclic(&self, start: &ProviderId) -> Result<(), RegistryError> {
        let mut path = vec![start.clone()];
        let mut finished = HashSet::new();
        self.visit(start, start, &mut path, &mut finished)
    }

    fn visit(
        &self,
        start: &ProviderId,
        current: &ProviderId,
        path: &mut Vec<ProviderId>,
        finished: &mut HashSet<ProviderId>,
    ) -> Result<(), RegistryError> {
        let Some(desc) = self.get(current.as_str()) else {
            return Ok(());
        };
        for next in &desc.fallback_chain {
            if next == start {
                let mut cycle = path.clone();
                cycle.push(next.clone());
                return Err(RegistryError::CyclicFallback { path: cycle });
            }
            if finished.contains(next) || path.contains(next) {
                continue;
            }
            path.push(next.clone());
            self.visit(start, next, path, finished)?;
            path.pop();
            finished.insert(next.clone());
        }
        Ok(())
    }

    /// Gets a descriptor by id.
    pub fn get(&self, id: &str) -> Option<&ProviderDescriptor> {
        self.index.get(id).map(|&position| &self.descriptors[position])
    }

    /// Gets a descriptor by id, failing for unknown ids.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] for unregistered ids.
    pub fn lookup(&self, id: &str) -> Result<&ProviderDescriptor, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::NotFound(ProviderId::new(id)))
    }

    /// Returns true if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All descriptors, in declaration order.
    pub fn all(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.descriptors.iter()
    }

    /// All ids, in declaration order.
    pub fn ids(&self) -> Vec<ProviderId> {
        self.descriptors.iter().map(|d| d.id.clone()).collect()
    }

    /// Descriptors serving `category`, highest priority first.
    ///
    /// Equal priorities keep declaration order.
    pub fn by_category(&self, category: Category) -> Vec<&ProviderDescriptor> {
        let mut list: Vec<_> = self
            .descriptors
            .iter()
            .filter(|d| d.category == category)
            .collect();
        list.sort_by_key(|d| d.priority);
        list
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::{InvokeContext, InvokeOptions, Provider};
    use async_trait::async_trait;
    use std::sync::Arc;
    use switchyard_core::{Priority, ProviderData};

    struct Noop;

    #[async_trait]
    impl Provider for Noop {
        async fn invoke(
            &self,
            _query: &str,
            _options: &InvokeOptions,
            _ctx: &InvokeContext<'_>,
        ) -> Result<ProviderData, ProviderError> {
            Ok(ProviderData::default())
        }
    }

    fn desc(id: &str, fallback: &[&str]) -> ProviderDescriptor {
        ProviderDescriptor::builder(id, Arc::new(Noop))
            .fallback(fallback.iter().copied())
            .build()
    }

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = ProviderRegistry::builtin().unwrap();
        assert_eq!(registry.len(), 14);
        for id in ["brave", "wttr", "wikipedia", "hackernews"] {
            assert!(registry.contains(id), "{id} missing");
        }
    }

    #[test]
    fn test_builtin_chains_never_reach_self() {
        let registry = ProviderRegistry::builtin().unwrap();
        for desc in registry.all() {
            let mut frontier = desc.fallback_chain.clone();
            let mut seen = HashSet::new();
            while let Some(next) = frontier.pop() {
                assert_ne!(next, desc.id);
                if seen.insert(next.clone()) {
                    frontier.extend(registry.get(next.as_str()).unwrap().fallback_chain.clone());
                }
            }
        }
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = ProviderRegistry::new(vec![desc("a", &[])]).unwrap();
        assert_eq!(
            registry.lookup("zzz").unwrap_err(),
            RegistryError::NotFound("zzz".into())
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = ProviderRegistry::new(vec![desc("a", &[]), desc("a", &[])]).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("a".into()));
    }

    #[test]
    fn test_unknown_fallback_rejected() {
        let err = ProviderRegistry::new(vec![desc("a", &["ghost"])]).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownFallback { .. }));
    }

    #[test]
    fn test_direct_cycle_rejected() {
        let err =
            ProviderRegistry::new(vec![desc("a", &["b"]), desc("b", &["a"])]).unwrap_err();
        let RegistryError::CyclicFallback { path } = err else {
            panic!("expected a cycle");
        };
        assert_eq!(path.first(), path.last());
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_indirect_cycle_rejected() {
        let result = ProviderRegistry::new(vec![
            desc("a", &["b"]),
            desc("b", &["c"]),
            desc("c", &["a"]),
        ]);
        assert!(matches!(result, Err(RegistryError::CyclicFallback { .. })));
    }

    #[test]
    fn test_shared_fallback_is_not_a_cycle() {
        let registry = ProviderRegistry::new(vec![
            desc("a", &["b", "c"]),
            desc("b", &["c"]),
            desc("c", &[]),
        ]);
        assert!(registry.is_ok());
    }

    #[test]
    fn test_by_category_sorted_by_priority() {
        let registry = ProviderRegistry::new(vec![
            ProviderDescriptor::builder("low", Arc::new(Noop))
                .category(Category::News)
                .priority(Priority::Low)
                .build(),
            ProviderDescriptor::builder("high", Arc::new(Noop))
                .category(Category::News)
                .priority(Priority::High)
                .build(),
            ProviderDescriptor::builder("medium", Arc::new(Noop))
                .category(Category::News)
                .build(),
            desc("other", &[]),
        ])
        .unwrap();
        let ids: Vec<_> = registry
            .by_category(Category::News)
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, ["high", "medium", "low"]);
    }
}
