//! Provider health checks.
//!
//! [`HealthProber::probe_all`] is the cheap check: it only asks the
//! credential store whether each provider's key is present.
//! [`HealthProber::probe_live`] sends one real, single-attempt request per
//! available provider, all of them concurrently.

use std::collections::BTreeMap;
use std::time::Instant;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use switchyard_core::{ErrorSummary, ProviderHealth, ProviderId};
use switchyard_fetch::CancellationToken;
use tracing::{debug, instrument};

use crate::descriptor::ProviderDescriptor;
use crate::error::OrchestrationError;
use crate::orchestrator::Orchestrator;
use crate::provider::{InvokeContext, InvokeOptions};

/// Outcome of a live probe of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveProbe {
    /// Credential requirement met.
    pub available: bool,
    /// The probe request succeeded.
    pub success: bool,
    /// Wall time of the probe request, from its rate-limit slot onwards.
    pub latency_ms: u64,
    /// Items returned.
    pub items: usize,
    /// Failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
}

/// Checks providers through an [`Orchestrator`]'s registry and transport.
#[derive(Debug, Clone, Copy)]
pub struct HealthProber<'a> {
    orchestrator: &'a Orchestrator,
}

impl<'a> HealthProber<'a> {
    /// Creates a prober.
    pub fn new(orchestrator: &'a Orchestrator) -> Self {
        Self { orchestrator }
    }

    /// Reports credential availability for every provider. No network.
    #[instrument(skip(self))]
    pub async fn probe_all(&self) -> BTreeMap<ProviderId, ProviderHealth> {
        let mut report = BTreeMap::new();
        for desc in self.orchestrator.registry().all() {
            let health = if self.orchestrator.is_available(desc).await {
                ProviderHealth::available()
            } else {
                ProviderHealth::unavailable(missing_credential(desc))
            };
            report.insert(desc.id.clone(), health);
        }
        debug!(providers = report.len(), "Probed credentials");
        report
    }

    /// Runs one single-attempt request per available provider.
    ///
    /// Uses `query` for every provider, or each descriptor's probe query.
    /// Fallback chains are not followed. Each probe still takes a slot on
    /// the shared rate limiter, but the wait for it is not counted in
    /// [`LiveProbe::latency_ms`].
    ///
    /// # Errors
    ///
    /// [`OrchestrationError::Cancelled`] when `cancel` fires.
    #[instrument(skip(self, cancel))]
    pub async fn probe_live(
        &self,
        query: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<ProviderId, LiveProbe>, OrchestrationError> {
        // The slot is taken in `probe_one`, before the clock starts.
        let options = InvokeOptions {
            max_attempts: Some(1),
            bypass_rate_limit: true,
            ..InvokeOptions::default()
        };

        let checks = self.orchestrator.registry().all().map(|desc| {
            let options = &options;
            async move {
                let probe = self
                    .probe_one(desc, query.unwrap_or(&desc.probe_query), options, cancel)
                    .await;
                (desc.id.clone(), probe)
            }
        });

        let mut report = BTreeMap::new();
        for (id, probe) in join_all(checks).await {
            report.insert(id, probe?);
        }
        Ok(report)
    }

    async fn probe_one(
        &self,
        desc: &ProviderDescriptor,
        query: &str,
        options: &InvokeOptions,
        cancel: &CancellationToken,
    ) -> Result<LiveProbe, OrchestrationError> {
        if !self.orchestrator.is_available(desc).await {
            return Ok(LiveProbe {
                available: false,
                success: false,
                latency_ms: 0,
                items: 0,
                error: Some(ErrorSummary::new(
                    "transport.authentication",
                    missing_credential(desc),
                )),
            });
        }

        let transport = self.orchestrator.transport();
        if cancel.is_cancelled() {
            return Err(OrchestrationError::Cancelled);
        }
        transport
            .limiter()
            .await_slot(cancel)
            .await
            .map_err(|_| OrchestrationError::Cancelled)?;

        let ctx = InvokeContext {
            provider_id: &desc.id,
            auth: &desc.auth,
            transport,
            cancel,
        };
        let started = Instant::now();
        let outcome = desc.provider().invoke(query, options, &ctx).await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(data) => Ok(LiveProbe {
                available: true,
                success: true,
                latency_ms,
                items: data.items.len(),
                error: None,
            }),
            Err(err) if err.is_cancelled() => Err(OrchestrationError::Cancelled),
            Err(err) => {
                debug!(provider = %desc.id, error = %err, "Live probe failed");
                Ok(LiveProbe {
                    available: true,
                    success: false,
                    latency_ms,
                    items: 0,
                    error: Some(err.to_summary()),
                })
            }
        }
    }
}

fn missing_credential(desc: &ProviderDescriptor) -> String {
    format!(
        "missing credential `{}`",
        desc.credential_type.as_deref().unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use switchyard_core::Category;
    use switchyard_fetch::{
        AuthConfig, MemoryCredentialStore, ReqwestExecutor, ResilientTransport, TransportSettings,
    };
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::hackernews::{self, HackerNewsProvider};
    use crate::openweathermap::OpenWeatherMapProvider;
    use crate::registry::ProviderRegistry;
    use crate::routing::RoutingTable;
    use crate::testing::http_transport;

    fn orchestrator(
        descriptors: Vec<ProviderDescriptor>,
        transport: ResilientTransport,
    ) -> Orchestrator {
        Orchestrator::new(
            Arc::new(ProviderRegistry::new(descriptors).unwrap()),
            Arc::new(RoutingTable::from_yaml("intents: []").unwrap()),
            Arc::new(transport),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_probe_all_reports_missing_credentials() {
        let orch = Orchestrator::builtin(Arc::new(http_transport(&[("newsapi", "k")]))).unwrap();
        let report = HealthProber::new(&orch).probe_all().await;

        assert_eq!(report.len(), 14);
        assert!(report["newsapi"].available);
        assert!(report["wttr"].available);
        let brave = &report["brave"];
        assert!(!brave.available);
        assert_eq!(brave.reason.as_deref(), Some("missing credential `brave`"));
    }

    #[tokio::test]
    async fn test_probe_live_mixed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("query", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hits": [
                    { "objectID": "1", "title": "Rust 2024", "url": "https://blog.rust-lang.org", "points": 10 }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let hn = hackernews::descriptor(HackerNewsProvider::with_base_url(server.uri()));
        // Keyed provider with no fallback chain and no stored key.
        let owm = ProviderDescriptor::builder(
            "openweathermap",
            Arc::new(OpenWeatherMapProvider::with_base_url(server.uri())),
        )
        .category(Category::Weather)
        .auth(AuthConfig::api_key_query("openweathermap", "appid"))
        .build();
        let orch = orchestrator(vec![hn, owm], http_transport(&[]));

        let report = HealthProber::new(&orch)
            .probe_live(Some("rust"), &CancellationToken::new())
            .await
            .unwrap();

        let hn = &report["hackernews"];
        assert!(hn.available && hn.success);
        assert_eq!(hn.items, 1);

        let owm = &report["openweathermap"];
        assert!(!owm.available);
        assert_eq!(
            owm.error.as_ref().map(|e| e.code.as_str()),
            Some("transport.authentication")
        );
    }

    #[tokio::test]
    async fn test_probe_live_single_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let hn = hackernews::descriptor(HackerNewsProvider::with_base_url(server.uri()));
        let settings = TransportSettings {
            min_interval: Duration::ZERO,
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            ..TransportSettings::default()
        };
        let transport = ResilientTransport::builder(
            Arc::new(ReqwestExecutor::new("test").unwrap()),
            Arc::new(MemoryCredentialStore::new()),
        )
        .settings(settings)
        .build();
        let orch = orchestrator(vec![hn], transport);

        let report = HealthProber::new(&orch)
            .probe_live(None, &CancellationToken::new())
            .await
            .unwrap();
        let probe = &report["hackernews"];
        assert!(!probe.success);
        assert_eq!(probe.error.as_ref().and_then(|e| e.http_status), Some(503));
    }

    #[tokio::test]
    async fn test_probe_live_latency_excludes_slot_wait() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "hits": [{ "objectID": "1", "title": "Rust", "url": null, "points": 1 }]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let first = hackernews::descriptor(HackerNewsProvider::with_base_url(server.uri()));
        let second = ProviderDescriptor::builder(
            "hackernews-mirror",
            Arc::new(HackerNewsProvider::with_base_url(server.uri())),
        )
        .category(Category::Tech)
        .build();

        let interval = Duration::from_millis(600);
        let settings = TransportSettings {
            min_interval: interval,
            max_attempts: 1,
            ..TransportSettings::default()
        };
        let transport = ResilientTransport::builder(
            Arc::new(ReqwestExecutor::new("test").unwrap()),
            Arc::new(MemoryCredentialStore::new()),
        )
        .settings(settings)
        .build();
        let orch = orchestrator(vec![first, second], transport);

        let started = Instant::now();
        let report = HealthProber::new(&orch)
            .probe_live(None, &CancellationToken::new())
            .await
            .unwrap();

        // The second probe waited a full interval for its slot.
        assert!(started.elapsed() >= interval);
        for probe in report.values() {
            assert!(probe.success);
            assert!(u128::from(probe.latency_ms) < interval.as_millis(), "{probe:?}");
        }
    }

    #[tokio::test]
    async fn test_probe_live_cancelled() {
        let orch = Orchestrator::builtin(Arc::new(http_transport(&[]))).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = HealthProber::new(&orch).probe_live(None, &cancel).await;
        assert!(matches!(result, Err(OrchestrationError::Cancelled)));
    }
}
