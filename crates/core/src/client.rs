//! Client facade
//!
//! [`PipelineClient`] owns the session manager, poster, coordinator and
//! selector. Build it with [`PipelineClientBuilder`]; the infra crate's
//! `connect` wires the production transport.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use ingestlink_common::{Clock, MetricsCollector, SystemClock};
use ingestlink_domain::{AuthScheme, ClientConfig, HostKey, IngestError, Result};

use crate::auth::authenticator_for;
use crate::pipeline::{BatchReceipt, PipelineBatch, PipelinePoster, RetryCoordinator};
use crate::routing::{HostSelector, RandomSource};
use crate::session::{SessionInfo, SessionManager, SessionStore};
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Resilient batch-submission client for a multi-host ingestion cluster.
///
/// Safe to share between threads; every public method blocks the calling
/// thread.
#[derive(Debug)]
pub struct PipelineClient {
    config: ClientConfig,
    auth_scheme: AuthScheme,
    transport: Arc<dyn Transport>,
    sessions: Arc<SessionManager>,
    poster: Arc<PipelinePoster>,
    coordinator: RetryCoordinator,
    selector: Arc<HostSelector>,
    request_counter: AtomicU64,
    shut_down: AtomicBool,
}

impl PipelineClient {
    pub fn builder(config: ClientConfig) -> PipelineClientBuilder {
        PipelineClientBuilder::new(config)
    }

    fn next_request_id(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(IngestError::Shutdown);
        }
        Ok(())
    }

    /// Submit a serialized batch to `path` on some live host.
    ///
    /// # Errors
    /// See [`RetryCoordinator::post_batch`]; [`IngestError::Shutdown`] after
    /// [`PipelineClient::shutdown`].
    #[instrument(skip(self, batch), fields(documents = batch.len()))]
    pub fn post_batch(&self, path: &str, batch: &PipelineBatch) -> Result<BatchReceipt> {
        self.ensure_running()?;
        let request_id = self.next_request_id();
        self.coordinator.post_batch(&normalize_path(path), batch, request_id)
    }

    /// Serialize `documents` and submit them as one batch.
    ///
    /// # Errors
    /// [`IngestError::Serialization`] plus everything
    /// [`PipelineClient::post_batch`] returns.
    pub fn post_documents<T: Serialize>(&self, path: &str, documents: &[T]) -> Result<BatchReceipt> {
        let batch = PipelineBatch::from_documents(documents)?;
        self.post_batch(path, &batch)
    }

    /// Execute an authenticated request against the host named by its URL.
    ///
    /// With `retry`, a 401 re-establishes the session and re-issues the
    /// request once. The caller owns the returned body.
    ///
    /// # Errors
    /// [`IngestError::Server`] for a non-2xx final status, plus session and
    /// transport errors.
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub fn send_request(&self, request: &TransportRequest, retry: bool) -> Result<TransportResponse> {
        self.ensure_running()?;
        let request_id = self.next_request_id();
        self.poster.send(request, retry, request_id)
    }

    /// One live host chosen the same way batch submissions choose
    ///
    /// # Errors
    /// [`IngestError::TotalOutage`] or [`IngestError::Shutdown`].
    pub fn available_server(&self) -> Result<Option<HostKey>> {
        self.ensure_running()?;
        Ok(self.selector.pick(&self.sessions.live_hosts()?))
    }

    /// Every live host, in ascending order
    ///
    /// # Errors
    /// [`IngestError::TotalOutage`] or [`IngestError::Shutdown`].
    pub fn available_servers(&self) -> Result<Vec<HostKey>> {
        self.ensure_running()?;
        self.sessions.live_hosts()
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        self.auth_scheme
    }

    /// Age of every live session
    ///
    /// # Errors
    /// [`IngestError::Shutdown`] after shutdown.
    pub fn session_snapshot(&self) -> Result<Vec<SessionInfo>> {
        self.sessions.snapshot()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of request ids handed out so far
    pub fn requests_issued(&self) -> u64 {
        self.request_counter.load(Ordering::Relaxed)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Clear every session and close the transport.
    ///
    /// Later calls fail with [`IngestError::Shutdown`]. Calling this twice
    /// only logs a warning.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            warn!("Pipeline client already shut down");
            return;
        }
        self.sessions.shutdown();
        self.transport.close();
        info!(requests = self.requests_issued(), "Pipeline client shut down");
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Builder for [`PipelineClient`]
///
/// A transport is required; clock, random source and metrics default to
/// the system clock, an entropy-seeded RNG and no metrics.
pub struct PipelineClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
    random: Option<Box<dyn RandomSource>>,
    metrics: Option<Arc<dyn MetricsCollector>>,
}

impl PipelineClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self { config, transport: None, clock: None, random: None, metrics: None }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn random_source(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    /// Seeded random source for reproducible host selection
    pub fn seed(self, seed: u64) -> Self {
        use rand::SeedableRng;
        self.random_source(Box::new(rand::rngs::StdRng::seed_from_u64(seed)))
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate the configuration, then establish sessions with every
    /// configured host.
    ///
    /// # Errors
    /// - [`IngestError::Config`] for invalid configuration or a missing
    ///   transport
    /// - the last login error if no host could be authenticated
    pub fn build(self) -> Result<PipelineClient> {
        self.config.validate()?;
        let transport = self
            .transport
            .ok_or_else(|| IngestError::Config("a transport is required".to_string()))?;
        let hosts = self.config.host_keys()?;
        let mode = self.config.auth_mode()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let selector = Arc::new(match self.random {
            Some(random) => HostSelector::new(random),
            None => HostSelector::default(),
        });

        let authenticator = authenticator_for(&mode, Arc::clone(&transport));
        let mut sessions = SessionManager::new(
            Arc::new(SessionStore::new()),
            authenticator,
            Arc::clone(&clock),
            hosts,
            self.config.session.clone(),
        );
        if let Some(metrics) = &self.metrics {
            sessions = sessions.with_metrics(Arc::clone(metrics));
        }
        let sessions = Arc::new(sessions);
        sessions.initialize()?;

        let poster = Arc::new(PipelinePoster::new(Arc::clone(&transport), Arc::clone(&sessions)));
        let mut coordinator = RetryCoordinator::new(
            Arc::clone(&sessions),
            Arc::clone(&poster),
            Arc::clone(&selector),
            clock,
            self.config.session.clone(),
        );
        if let Some(metrics) = self.metrics {
            coordinator = coordinator.with_metrics(metrics);
        }

        info!(
            hosts = self.config.hosts.len(),
            auth = %mode.scheme(),
            "Pipeline client ready"
        );

        Ok(PipelineClient {
            auth_scheme: mode.scheme(),
            config: self.config,
            transport,
            sessions,
            poster,
            coordinator,
            selector,
            request_counter: AtomicU64::new(0),
            shut_down: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ingestlink_domain::constants::{METRIC_DOCS_SENT, METRIC_SESSION_RESETS};
    use serde_json::json;

    use super::*;
    use crate::testing::{
        FixedIndexSource, MockClock, RecordingMetricsCollector, ScriptedResponse, ScriptedTransport,
    };

    const PATH: &str = "/api/apollo/index-pipelines/p/collections/c/index";

    fn realm_config(hosts: &str) -> ClientConfig {
        ClientConfig::new(hosts).with_credentials("admin", "pw", Some("native".into()))
    }

    fn login(host: &str) -> String {
        format!("http://{host}/api/session")
    }

    fn pipe(host: &str) -> String {
        format!("http://{host}{PATH}")
    }

    fn docs() -> Vec<serde_json::Value> {
        vec![json!({"id": "doc-1"}), json!({"id": "doc-2"})]
    }

    #[test]
    fn test_build_requires_transport() {
        let err = PipelineClient::builder(ClientConfig::new("a:1")).build().unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let transport = Arc::new(ScriptedTransport::new());
        let err = PipelineClient::builder(ClientConfig::new(""))
            .transport(transport.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_build_fails_when_no_host_authenticates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.always(&login("a:1"), ScriptedResponse::status(401).with_body("denied"));

        let err = PipelineClient::builder(realm_config("a:1"))
            .transport(transport)
            .build()
            .unwrap_err();
        assert!(matches!(err, IngestError::Authentication { status: Some(401), .. }));
    }

    #[test]
    fn test_end_to_end_with_failover_and_idle_reset() {
        let transport = Arc::new(ScriptedTransport::new());
        let clock = MockClock::new();
        let metrics = RecordingMetricsCollector::new();
        for host in ["a:1", "b:1"] {
            transport.always(&login(host), ScriptedResponse::ok().with_header("Set-Cookie", "id=1"));
        }
        transport.always(&pipe("a:1"), ScriptedResponse::status(503));
        transport.always(&pipe("b:1"), ScriptedResponse::status(204));

        let client = PipelineClient::builder(realm_config("a:1,b:1"))
            .transport(transport.clone())
            .clock(Arc::new(clock.clone()))
            .random_source(Box::new(FixedIndexSource::new(vec![0])))
            .metrics(Arc::new(metrics.clone()))
            .build()
            .unwrap();
        assert_eq!(client.auth_scheme(), AuthScheme::CookieRealm);

        let receipt = client.post_documents(PATH, &docs()).unwrap();
        assert_eq!(receipt.request_id, 1);
        assert_eq!(receipt.attempts, 2);
        assert_eq!(receipt.host.as_str(), "http://b:1");

        clock.advance(Duration::from_secs(600));
        let receipt = client.post_documents(PATH.trim_start_matches('/'), &docs()).unwrap();
        assert_eq!(receipt.request_id, 2);
        assert_eq!(transport.count(&login("b:1")), 2);
        assert_eq!(metrics.counter_total(METRIC_SESSION_RESETS, &[("host", "http://b:1")]), 1);
        assert_eq!(metrics.counter_total(METRIC_DOCS_SENT, &[("host", "http://b:1")]), 4);
    }

    #[test]
    fn test_available_servers_and_snapshot() {
        let transport = Arc::new(ScriptedTransport::new());
        let clock = MockClock::new();
        let client = PipelineClient::builder(ClientConfig::new("b:1, a:1"))
            .transport(transport)
            .clock(Arc::new(clock.clone()))
            .seed(99)
            .build()
            .unwrap();

        let all = client.available_servers().unwrap();
        assert_eq!(all.iter().map(HostKey::as_str).collect::<Vec<_>>(), vec!["http://a:1", "http://b:1"]);
        assert!(all.contains(&client.available_server().unwrap().unwrap()));

        clock.advance(Duration::from_secs(30));
        let snapshot = client.session_snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|info| info.age == Duration::from_secs(30)));
    }

    #[test]
    fn test_send_request_uses_shared_request_counter() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.always("http://a:1/api/status", ScriptedResponse::ok().with_body("up"));
        transport.always(&pipe("a:1"), ScriptedResponse::ok());
        let client = PipelineClient::builder(ClientConfig::new("a:1"))
            .transport(transport)
            .build()
            .unwrap();

        client.post_documents(PATH, &docs()).unwrap();
        let response = client.send_request(&TransportRequest::get("http://a:1/api/status"), true).unwrap();

        assert_eq!(response.bytes().unwrap(), b"up");
        assert_eq!(client.requests_issued(), 2);
    }

    #[test]
    fn test_basic_auth_header_on_submissions() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.always(&pipe("a:1"), ScriptedResponse::ok());
        let client = PipelineClient::builder(ClientConfig::new("a:1").with_credentials("u", "p", None))
            .transport(transport.clone())
            .build()
            .unwrap();

        client.post_documents(PATH, &docs()).unwrap();

        let posted = transport.requests_to(&pipe("a:1"));
        assert_eq!(posted[0].header("authorization"), Some("Basic dTpw"));
        assert_eq!(transport.count(&login("a:1")), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent_and_final() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = PipelineClient::builder(ClientConfig::new("a:1"))
            .transport(transport.clone())
            .build()
            .unwrap();

        client.shutdown();
        client.shutdown();

        assert!(client.is_shut_down());
        assert!(transport.is_closed());
        assert!(matches!(client.post_documents(PATH, &docs()), Err(IngestError::Shutdown)));
        assert!(matches!(client.available_servers(), Err(IngestError::Shutdown)));
        assert!(matches!(client.session_snapshot(), Err(IngestError::Shutdown)));
    }

    #[test]
    fn test_shared_client_fails_over_from_many_threads() {
        let transport = Arc::new(ScriptedTransport::new());
        let metrics = RecordingMetricsCollector::new();
        for host in ["a:1", "b:1", "c:1"] {
            transport.always(&login(host), ScriptedResponse::ok().with_header("Set-Cookie", "id=1"));
        }
        transport.always(&pipe("a:1"), ScriptedResponse::status(401));
        transport.always(&pipe("b:1"), ScriptedResponse::status(503));
        transport.always(&pipe("c:1"), ScriptedResponse::ok());

        let client = PipelineClient::builder(realm_config("a:1,b:1,c:1"))
            .transport(transport.clone())
            .seed(11)
            .metrics(Arc::new(metrics.clone()))
            .build()
            .unwrap();

        let shared = &client;
        let receipts: Vec<BatchReceipt> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(move || {
                        (0..25)
                            .map(|_| shared.post_documents(PATH, &docs()).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers.into_iter().flat_map(|worker| worker.join().unwrap()).collect()
        });

        assert_eq!(receipts.len(), 200);
        assert!(receipts.iter().all(|receipt| receipt.host.as_str() == "http://c:1"));
        assert!(receipts.iter().all(|receipt| (1..=3).contains(&receipt.attempts)));

        let mut ids: Vec<u64> = receipts.iter().map(|receipt| receipt.request_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(client.requests_issued(), 200);

        let live = client.available_servers().unwrap();
        assert_eq!(
            live.iter().map(HostKey::as_str).collect::<Vec<_>>(),
            vec!["http://a:1", "http://b:1", "http://c:1"]
        );
        let mut snapshot_hosts: Vec<HostKey> =
            client.session_snapshot().unwrap().into_iter().map(|info| info.host).collect();
        snapshot_hosts.sort();
        snapshot_hosts.dedup();
        assert_eq!(snapshot_hosts.len(), 3);
        assert_eq!(transport.count(&pipe("c:1")), 200);
        assert_eq!(metrics.counter_total(METRIC_DOCS_SENT, &[("host", "http://c:1")]), 400);
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PipelineClient>();
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("index"), "/index");
        assert_eq!(normalize_path(" /index "), "/index");
    }
}
