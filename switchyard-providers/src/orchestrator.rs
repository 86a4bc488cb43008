//! Fallback and multi-provider orchestration.
//!
//! The [`Orchestrator`] is the single entry point callers use:
//!
//! - [`Orchestrator::execute_with_fallback`] runs one provider and, on
//!   failure, walks its fallback chain in order.
//! - [`Orchestrator::execute_for_intent`] classifies free text, picks the
//!   intent's providers from the routing table and runs one of them or
//!   several concurrently.
//! - [`Orchestrator::execute`] dispatches between the two.
//!
//! Candidates whose required credential is missing are skipped without a
//! network call. Cancellation is checked before each candidate and inside
//! the transport, and always surfaces as [`OrchestrationError::Cancelled`].

use std::iter;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use switchyard_core::{
    CandidateFailure, Category, IntentClassifier, IntentResult, OrchestrationResult,
};
use switchyard_fetch::{CancellationToken, ResilientTransport, TransportError};
use tracing::{debug, info, instrument, warn};

use crate::descriptor::ProviderDescriptor;
use crate::error::{OrchestrationError, ProviderError, RegistryError};
use crate::provider::{InvokeContext, InvokeOptions};
use crate::registry::ProviderRegistry;
use crate::routing::RoutingTable;

/// Default number of providers run concurrently in multi mode.
pub const DEFAULT_MAX_PROVIDERS: usize = 2;

/// Default confidence below which intent execution fans out.
pub const DEFAULT_MULTI_PROVIDER_CONFIDENCE: f64 = 0.5;

// ============================================================================
// Settings and Options
// ============================================================================

/// Process-wide orchestration defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrchestratorSettings {
    /// Providers run concurrently in multi mode.
    pub max_providers: usize,
    /// Classifier confidence below which multi mode is the default.
    pub multi_provider_confidence: f64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_providers: DEFAULT_MAX_PROVIDERS,
            multi_provider_confidence: DEFAULT_MULTI_PROVIDER_CONFIDENCE,
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteOptions {
    /// Force multi (`Some(true)`) or single (`Some(false)`) mode.
    /// `None` decides from classifier confidence.
    pub use_multiple: Option<bool>,
    /// Overrides [`OrchestratorSettings::max_providers`].
    pub max_providers: Option<usize>,
    /// Keep providers whose credential is missing when selecting by intent.
    pub include_unavailable: bool,
    /// Options passed to every provider invocation.
    pub invoke: InvokeOptions,
}

impl ExecuteOptions {
    /// Forces single-provider mode.
    pub fn single() -> Self {
        Self {
            use_multiple: Some(false),
            ..Self::default()
        }
    }

    /// Forces multi-provider mode.
    pub fn multiple() -> Self {
        Self {
            use_multiple: Some(true),
            ..Self::default()
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Selects, runs and aggregates providers.
#[derive(Debug)]
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    routing: Arc<RoutingTable>,
    classifier: IntentClassifier,
    transport: Arc<ResilientTransport>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// Creates an orchestrator.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotFound`] if the routing table names an
    /// unregistered provider.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        routing: Arc<RoutingTable>,
        transport: Arc<ResilientTransport>,
    ) -> Result<Self, RegistryError> {
        routing.validate(&registry)?;
        Ok(Self {
            classifier: routing.classifier(),
            registry,
            routing,
            transport,
            settings: OrchestratorSettings::default(),
        })
    }

    /// Creates an orchestrator over the built-in registry and routing table.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in catalog is inconsistent.
    pub fn builtin(transport: Arc<ResilientTransport>) -> Result<Self, RegistryError> {
        Self::new(
            Arc::new(ProviderRegistry::builtin()?),
            Arc::new(RoutingTable::builtin()?),
            transport,
        )
    }

    /// Replaces the orchestration defaults.
    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The provider registry.
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// The routing table.
    pub fn routing(&self) -> &Arc<RoutingTable> {
        &self.routing
    }

    /// The shared transport.
    pub fn transport(&self) -> &Arc<ResilientTransport> {
        &self.transport
    }

    /// Classifies a query with the routing table's keywords.
    pub fn classify(&self, query: &str) -> IntentResult {
        self.classifier.classify(query)
    }

    /// Returns true if the descriptor's credential requirement is met.
    pub async fn is_available(&self, descriptor: &ProviderDescriptor) -> bool {
        match descriptor.credential_type.as_deref() {
            Some(name) if descriptor.requires_credential => {
                self.transport.credentials().has(name).await
            }
            _ => true,
        }
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Runs `target` as a provider id, an intent name or free text.
    ///
    /// - a registered provider id runs [`Self::execute_with_fallback`] with `query`
    /// - an intent name (`news`, `weather`, ...) routes `query` to that intent
    /// - anything else is free text, joined with `query`, and runs
    ///   [`Self::execute_for_intent`]
    ///
    /// # Errors
    ///
    /// See [`Self::execute_with_fallback`] and [`Self::execute_for_intent`].
    pub async fn execute(
        &self,
        target: &str,
        query: Option<&str>,
        options: &ExecuteOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<OrchestrationResult>, OrchestrationError> {
        if self.registry.contains(target) {
            let result = self
                .execute_with_fallback(target, query.unwrap_or_default(), options, cancel)
                .await?;
            return Ok(vec![result]);
        }

        if let (Ok(category), Some(query)) = (target.parse::<Category>(), query) {
            let intent = IntentResult {
                intent: category,
                confidence: 1.0,
                alternatives: Vec::new(),
            };
            return self.run_intent(&intent, query, options, cancel).await;
        }

        let text = match query {
            Some(query) => format!("{target} {query}"),
            None => target.to_string(),
        };
        self.execute_for_intent(&text, options, cancel).await
    }

    /// Runs one provider, then its fallback chain, until one succeeds.
    ///
    /// # Errors
    ///
    /// - [`OrchestrationError::Configuration`] for unknown ids
    /// - [`OrchestrationError::AllProvidersFailed`] when every candidate failed
    /// - [`OrchestrationError::Cancelled`] when `cancel` fires
    #[instrument(skip(self, query, options, cancel), fields(provider = provider_id))]
    pub async fn execute_with_fallback(
        &self,
        provider_id: &str,
        query: &str,
        options: &ExecuteOptions,
        cancel: &CancellationToken,
    ) -> Result<OrchestrationResult, OrchestrationError> {
        let started = Instant::now();
        let primary = self.registry.lookup(provider_id)?;
        let fallbacks = primary
            .fallback_chain
            .iter()
            .map(|id| self.registry.lookup(id.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut failures = Vec::new();
        let mut last_error = None;

        for candidate in iter::once(primary).chain(fallbacks) {
            if cancel.is_cancelled() {
                return Err(OrchestrationError::Cancelled);
            }

            if !self.is_available(candidate).await {
                let err = ProviderError::Transport(TransportError::Authentication {
                    credential: candidate.credential_type.clone().unwrap_or_default(),
                });
                debug!(candidate = %candidate.id, "Skipping candidate without credential");
                failures.push(CandidateFailure {
                    provider_id: candidate.id.clone(),
                    error: err.to_summary(),
                    skipped: true,
                });
                last_error = Some(err);
                continue;
            }

            debug!(candidate = %candidate.id, "Invoking candidate");
            let ctx = InvokeContext {
                provider_id: &candidate.id,
                auth: &candidate.auth,
                transport: &self.transport,
                cancel,
            };

            match candidate.provider().invoke(query, &options.invoke, &ctx).await {
                Ok(data) => {
                    let was_fallback = candidate.id != primary.id;
                    if was_fallback {
                        warn!(candidate = %candidate.id, "Served by fallback provider");
                    } else {
                        info!(items = data.items.len(), "Provider succeeded");
                    }
                    return Ok(OrchestrationResult::success(
                        candidate.id.clone(),
                        was_fallback,
                        data,
                        failures,
                        elapsed_ms(started),
                    ));
                }
                Err(err) if err.is_cancelled() => return Err(OrchestrationError::Cancelled),
                Err(err) => {
                    warn!(candidate = %candidate.id, error = %err, "Candidate failed");
                    failures.push(CandidateFailure {
                        provider_id: candidate.id.clone(),
                        error: err.to_summary(),
                        skipped: false,
                    });
                    last_error = Some(err);
                }
            }
        }

        Err(OrchestrationError::AllProvidersFailed {
            provider_id: primary.id.clone(),
            // The chain always holds at least the primary.
            last_error: last_error.unwrap_or(ProviderError::EmptyResult),
            failures,
        })
    }

    /// Classifies `query` and runs the intent's providers.
    ///
    /// Multi mode returns one result per provider run, failures included.
    /// Single mode returns exactly one result.
    ///
    /// # Errors
    ///
    /// - [`OrchestrationError::NoAvailableProvider`] if no provider is usable
    /// - [`OrchestrationError::AllProvidersFailed`] in single mode
    /// - [`OrchestrationError::Cancelled`] when `cancel` fires
    #[instrument(skip(self, query, options, cancel))]
    pub async fn execute_for_intent(
        &self,
        query: &str,
        options: &ExecuteOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<OrchestrationResult>, OrchestrationError> {
        let intent = self.classify(query);
        debug!(
            intent = %intent.intent,
            confidence = intent.confidence,
            alternatives = intent.alternatives.len(),
            "Classified query"
        );
        self.run_intent(&intent, query, options, cancel).await
    }

    async fn run_intent(
        &self,
        intent: &IntentResult,
        query: &str,
        options: &ExecuteOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<OrchestrationResult>, OrchestrationError> {
        let no_provider = OrchestrationError::NoAvailableProvider {
            intent: intent.intent,
        };
        let Some(route) = self.routing.route(intent.intent) else {
            return Err(no_provider);
        };

        let mut selected = self.select(&route.primary, options).await;
        if selected.is_empty() {
            debug!(intent = %intent.intent, "No primary provider available, using fallback set");
            selected = self.select(&route.fallback, options).await;
        }
        if selected.is_empty() {
            return Err(no_provider);
        }

        let multi = options
            .use_multiple
            .unwrap_or(intent.confidence < self.settings.multi_provider_confidence);

        if !multi {
            let top = &selected[0].id;
            let result = self
                .execute_with_fallback(top.as_str(), query, options, cancel)
                .await?;
            return Ok(vec![result]);
        }

        let limit = options
            .max_providers
            .unwrap_or(self.settings.max_providers)
            .max(1);
        info!(
            intent = %intent.intent,
            providers = selected.len().min(limit),
            "Running providers concurrently"
        );

        let runs = selected.iter().take(limit).map(|desc| async move {
            let started = Instant::now();
            let outcome = self
                .execute_with_fallback(desc.id.as_str(), query, options, cancel)
                .await;
            (outcome, elapsed_ms(started))
        });

        let mut results = Vec::new();
        for (outcome, latency_ms) in join_all(runs).await {
            match outcome {
                Ok(result) => results.push(result),
                Err(OrchestrationError::AllProvidersFailed {
                    provider_id,
                    last_error,
                    failures,
                }) => results.push(OrchestrationResult::failure(
                    provider_id,
                    last_error.to_summary(),
                    failures,
                    latency_ms,
                )),
                Err(other) => return Err(other),
            }
        }
        Ok(results)
    }

    /// Resolves ids, drops unavailable ones and sorts by priority.
    async fn select(
        &self,
        ids: &[switchyard_core::ProviderId],
        options: &ExecuteOptions,
    ) -> Vec<&ProviderDescriptor> {
        let mut selected = Vec::with_capacity(ids.len());
        for desc in ids.iter().filter_map(|id| self.registry.get(id.as_str())) {
            if options.include_unavailable || self.is_available(desc).await {
                selected.push(desc);
            } else {
                debug!(provider = %desc.id, "Provider unavailable, not selected");
            }
        }
        selected.sort_by_key(|d| d.priority);
        selected
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use switchyard_core::{Priority, ProviderData, ResultItem};
    use switchyard_fetch::{
        AuthConfig, HttpExecutor, HttpRequest, HttpResponse, MemoryCredentialStore,
        RequestContext, TransportSettings,
    };

    use crate::provider::Provider;

    // ------------------------------------------------------------------------
    // Fakes
    // ------------------------------------------------------------------------

    #[derive(Default)]
    struct SpyExecutor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HttpExecutor for SpyExecutor {
        async fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse {
                status: 200,
                content_type: Some("application/json".into()),
                body: b"{}".to_vec(),
            })
        }
    }

    #[derive(Clone)]
    enum Outcome {
        Succeed,
        Fail(ProviderError),
        /// Goes through the transport, then succeeds.
        Fetch,
    }

    struct FakeProvider {
        id: &'static str,
        outcome: Outcome,
        calls: AtomicUsize,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FakeProvider {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for FakeProvider {
        async fn invoke(
            &self,
            query: &str,
            _options: &InvokeOptions,
            ctx: &InvokeContext<'_>,
        ) -> Result<ProviderData, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(self.id);
            match &self.outcome {
                Outcome::Succeed => Ok(ProviderData::from_items(vec![ResultItem::new(format!(
                    "{} says {query}",
                    self.id
                ))])),
                Outcome::Fail(err) => Err(err.clone()),
                Outcome::Fetch => {
                    ctx.fetch(RequestContext::get("https://fake.test/")).await?;
                    Ok(ProviderData::from_summary(self.id))
                }
            }
        }
    }

    struct Fixture {
        id: &'static str,
        priority: Priority,
        outcome: Outcome,
        fallback: Vec<&'static str>,
        credential: Option<&'static str>,
    }

    fn fixture(id: &'static str, outcome: Outcome) -> Fixture {
        Fixture {
            id,
            priority: Priority::Medium,
            outcome,
            fallback: Vec::new(),
            credential: None,
        }
    }

    impl Fixture {
        fn fallback(mut self, chain: &[&'static str]) -> Self {
            self.fallback = chain.to_vec();
            self
        }

        fn priority(mut self, priority: Priority) -> Self {
            self.priority = priority;
            self
        }

        fn credential(mut self, name: &'static str) -> Self {
            self.credential = Some(name);
            self
        }
    }

    struct Harness {
        orchestrator: Orchestrator,
        fakes: HashMap<&'static str, Arc<FakeProvider>>,
        executor: Arc<SpyExecutor>,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Harness {
        fn calls(&self, id: &str) -> usize {
            self.fakes[id].calls()
        }

        fn log(&self) -> Vec<&'static str> {
            self.log.lock().unwrap().clone()
        }
    }

    const EMPTY_ROUTING: &str = "intents: []";

    fn harness(fixtures: Vec<Fixture>, routing: &str, secrets: &[(&str, &str)]) -> Harness {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut fakes = HashMap::new();
        let mut descriptors = Vec::new();
        for fixture in fixtures {
            let fake = Arc::new(FakeProvider {
                id: fixture.id,
                outcome: fixture.outcome,
                calls: AtomicUsize::new(0),
                log: Arc::clone(&log),
            });
            fakes.insert(fixture.id, Arc::clone(&fake));
            let mut builder = ProviderDescriptor::builder(fixture.id, fake)
                .category(Category::News)
                .priority(fixture.priority)
                .fallback(fixture.fallback);
            if let Some(name) = fixture.credential {
                builder = builder.auth(AuthConfig::api_key_header(name, "X-Key"));
            }
            descriptors.push(builder.build());
        }

        let executor = Arc::new(SpyExecutor::default());
        let settings = TransportSettings {
            min_interval: Duration::ZERO,
            max_attempts: 1,
            ..TransportSettings::default()
        };
        let transport = ResilientTransport::builder(
            Arc::clone(&executor) as Arc<dyn HttpExecutor>,
            Arc::new(MemoryCredentialStore::with_secrets(secrets.iter().copied())),
        )
        .settings(settings)
        .build();

        let orchestrator = Orchestrator::new(
            Arc::new(ProviderRegistry::new(descriptors).unwrap()),
            Arc::new(RoutingTable::from_yaml(routing).unwrap()),
            Arc::new(transport),
        )
        .unwrap();

        Harness {
            orchestrator,
            fakes,
            executor,
            log,
        }
    }

    fn network() -> Outcome {
        Outcome::Fail(ProviderError::Transport(TransportError::Network(
            "connection reset".into(),
        )))
    }

    // ------------------------------------------------------------------------
    // Fallback chains
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_primary_success() {
        let h = harness(
            vec![fixture("a", Outcome::Succeed).fallback(&["b"]), fixture("b", Outcome::Succeed)],
            EMPTY_ROUTING,
            &[],
        );
        let result = h
            .orchestrator
            .execute_with_fallback("a", "q", &ExecuteOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.success);
        assert!(!result.was_fallback);
        assert_eq!(result.provider_id, "a");
        assert!(result.failures.is_empty());
        assert_eq!(h.calls("b"), 0);
    }

    #[tokio::test]
    async fn test_chain_runs_in_order_once_each() {
        let h = harness(
            vec![
                fixture("a", network()).fallback(&["b", "c"]),
                fixture("b", network()),
                fixture("c", Outcome::Succeed),
            ],
            EMPTY_ROUTING,
            &[],
        );
        let result = h
            .orchestrator
            .execute_with_fallback("a", "q", &ExecuteOptions::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(h.log(), ["a", "b", "c"]);
        assert_eq!(result.provider_id, "c");
        assert!(result.was_fallback);
        assert!(result.is_degraded());
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.failures[0].error.code, "transport.network");
    }

    #[tokio::test]
    async fn test_all_failed_carries_last_error() {
        let h = harness(
            vec![
                fixture("a", network()).fallback(&["b"]),
                fixture("b", Outcome::Fail(ProviderError::EmptyResult)),
            ],
            EMPTY_ROUTING,
            &[],
        );
        let err = h
            .orchestrator
            .execute_with_fallback("a", "q", &ExecuteOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();

        let OrchestrationError::AllProvidersFailed {
            provider_id,
            last_error,
            failures,
        } = err
        else {
            panic!("expected AllProvidersFailed, got {err:?}");
        };
        assert_eq!(provider_id, "a");
        assert!(matches!(last_error, ProviderError::EmptyResult));
        assert_eq!(failures.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_credential_skips_without_network() {
        let h = harness(
            vec![
                fixture("keyed", Outcome::Fetch)
                    .credential("keyed-secret")
                    .fallback(&["free"]),
                fixture("free", Outcome::Succeed),
            ],
            EMPTY_ROUTING,
            &[],
        );
        let result = h
            .orchestrator
            .execute_with_fallback(
                "keyed",
                "q",
                &ExecuteOptions::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(h.calls("keyed"), 0);
        assert_eq!(h.executor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.provider_id, "free");
        assert!(result.failures[0].skipped);
        assert_eq!(result.failures[0].error.code, "transport.authentication");
    }

    #[tokio::test]
    async fn test_present_credential_reaches_transport() {
        let h = harness(
            vec![fixture("keyed", Outcome::Fetch).credential("keyed-secret")],
            EMPTY_ROUTING,
            &[("keyed-secret", "s3cret")],
        );
        let result = h
            .orchestrator
            .execute_with_fallback(
                "keyed",
                "q",
                &ExecuteOptions::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(h.executor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_provider_is_configuration_error() {
        let h = harness(vec![fixture("a", Outcome::Succeed)], EMPTY_ROUTING, &[]);
        let err = h
            .orchestrator
            .execute_with_fallback(
                "nope",
                "q",
                &ExecuteOptions::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::Configuration(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let h = harness(vec![fixture("a", Outcome::Succeed)], EMPTY_ROUTING, &[]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = h
            .orchestrator
            .execute_with_fallback("a", "q", &ExecuteOptions::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestrationError::Cancelled));
        assert_eq!(h.calls("a"), 0);
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_chain() {
        let h = harness(
            vec![
                fixture("a", Outcome::Fail(ProviderError::Transport(TransportError::Cancelled)))
                    .fallback(&["b"]),
                fixture("b", Outcome::Succeed),
            ],
            EMPTY_ROUTING,
            &[],
        );
        let err = h
            .orchestrator
            .execute_with_fallback("a", "q", &ExecuteOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestrationError::Cancelled));
        assert_eq!(h.calls("b"), 0);
    }

    // ------------------------------------------------------------------------
    // Intent execution
    // ------------------------------------------------------------------------

    const WEATHER_ROUTING: &str = r"
intents:
  - intent: weather
    keywords: [weather]
    primary: [owm]
    fallback: [wttr]
";

    #[tokio::test]
    async fn test_single_mode_one_result() {
        let h = harness(
            vec![
                fixture("owm", Outcome::Succeed).credential("owm").fallback(&["wttr"]),
                fixture("wttr", Outcome::Succeed),
            ],
            WEATHER_ROUTING,
            &[("owm", "k")],
        );
        let results = h
            .orchestrator
            .execute_for_intent(
                "weather in Paris",
                &ExecuteOptions::single(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].provider_id, "owm");
        assert!(!results[0].was_fallback);
        assert_eq!(h.calls("wttr"), 0);
    }

    #[tokio::test]
    async fn test_fallback_set_used_when_primary_unavailable() {
        let h = harness(
            vec![
                fixture("owm", Outcome::Succeed).credential("owm"),
                fixture("wttr", Outcome::Succeed),
            ],
            WEATHER_ROUTING,
            &[],
        );
        let results = h
            .orchestrator
            .execute_for_intent(
                "weather in Paris",
                &ExecuteOptions::single(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(results[0].provider_id, "wttr");
        assert_eq!(h.calls("owm"), 0);
    }

    #[tokio::test]
    async fn test_include_unavailable_keeps_primary() {
        let h = harness(
            vec![
                fixture("owm", Outcome::Succeed).credential("owm").fallback(&["wttr"]),
                fixture("wttr", Outcome::Succeed),
            ],
            WEATHER_ROUTING,
            &[],
        );
        let options = ExecuteOptions {
            include_unavailable: true,
            ..ExecuteOptions::single()
        };
        let results = h
            .orchestrator
            .execute_for_intent("weather in Paris", &options, &CancellationToken::new())
            .await
            .unwrap();
        // Selected, then skipped by the pre-flight check.
        assert_eq!(results[0].provider_id, "wttr");
        assert!(results[0].was_fallback);
        assert!(results[0].failures[0].skipped);
    }

    #[tokio::test]
    async fn test_nothing_available() {
        let h = harness(
            vec![
                fixture("owm", Outcome::Succeed).credential("owm"),
                fixture("wttr", Outcome::Succeed).credential("wttr"),
            ],
            WEATHER_ROUTING,
            &[],
        );
        let err = h
            .orchestrator
            .execute_for_intent("weather", &ExecuteOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::NoAvailableProvider { intent: Category::Weather }
        ));
    }

    const NEWS_ROUTING: &str = r"
intents:
  - intent: news
    keywords: [news]
    primary: [n3, n2, n1]
";

    fn news_harness() -> Harness {
        harness(
            vec![
                fixture("n1", Outcome::Succeed).priority(Priority::High),
                fixture("n2", network()).priority(Priority::Medium),
                fixture("n3", Outcome::Succeed).priority(Priority::Low),
            ],
            NEWS_ROUTING,
            &[],
        )
    }

    #[tokio::test]
    async fn test_low_confidence_runs_multiple() {
        let h = news_harness();
        // 4 of 36 characters match: well below 0.5.
        let results = h
            .orchestrator
            .execute_for_intent(
                "news about the new chip launch event",
                &ExecuteOptions::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].provider_id, "n1");
        assert!(results[0].success);
        assert_eq!(results[1].provider_id, "n2");
        assert!(!results[1].success);
        assert_eq!(
            results[1].error.as_ref().map(|e| e.code.as_str()),
            Some("transport.network")
        );
        assert_eq!(h.calls("n3"), 0);
    }

    #[tokio::test]
    async fn test_high_confidence_runs_top_priority_only() {
        let h = news_harness();
        let results = h
            .orchestrator
            .execute_for_intent("news", &ExecuteOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].provider_id, "n1");
        assert_eq!(h.log(), ["n1"]);
    }

    #[tokio::test]
    async fn test_max_providers_override() {
        let h = news_harness();
        let options = ExecuteOptions {
            max_providers: Some(3),
            ..ExecuteOptions::multiple()
        };
        let results = h
            .orchestrator
            .execute_for_intent("news", &options, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.success).count(), 2);
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_execute_dispatch() {
        let h = news_harness();
        let cancel = CancellationToken::new();
        let options = ExecuteOptions::default();

        let by_id = h.orchestrator.execute("n3", Some("rust"), &options, &cancel).await.unwrap();
        assert_eq!(by_id[0].provider_id, "n3");

        let by_intent = h
            .orchestrator
            .execute("news", Some("rust"), &options, &cancel)
            .await
            .unwrap();
        assert_eq!(by_intent.len(), 1);
        assert_eq!(by_intent[0].provider_id, "n1");

        // Free text without a matching route.
        let err = h
            .orchestrator
            .execute("zzz", Some("qqq"), &options, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrchestrationError::NoAvailableProvider { intent: Category::Search }
        ));
    }

    #[test]
    fn test_routing_must_match_registry() {
        let registry = Arc::new(ProviderRegistry::new(Vec::new()).unwrap());
        let routing = Arc::new(RoutingTable::from_yaml(NEWS_ROUTING).unwrap());
        let transport = Arc::new(
            ResilientTransport::builder(
                Arc::new(SpyExecutor::default()),
                Arc::new(MemoryCredentialStore::new()),
            )
            .build(),
        );
        assert!(Orchestrator::new(registry, routing, transport).is_err());
    }
}
