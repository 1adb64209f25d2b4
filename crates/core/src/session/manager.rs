use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use ingestlink_common::{Clock, MetricsCollector};
use ingestlink_domain::constants::{METRIC_LIVE_HOSTS, METRIC_SESSION_RESETS};
use ingestlink_domain::{HostKey, IngestError, Result, SessionConfig};

use super::store::SessionStore;
use super::table::{DocsSentMeter, Session, SessionInfo, SessionTable};
use crate::auth::Authenticator;

/// Owns the session lifecycle for every configured host.
///
/// Network calls (logins) happen outside the store lock. Whole-table
/// rebuilds are serialized by a second lock; a caller that acquires it
/// re-checks the table before rebuilding.
#[derive(Debug)]
pub struct SessionManager {
    store: Arc<SessionStore>,
    authenticator: Arc<dyn Authenticator>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<dyn MetricsCollector>>,
    original_hosts: Vec<HostKey>,
    settings: SessionConfig,
    rebuild_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        store: Arc<SessionStore>,
        authenticator: Arc<dyn Authenticator>,
        clock: Arc<dyn Clock>,
        original_hosts: Vec<HostKey>,
        settings: SessionConfig,
    ) -> Self {
        Self {
            store,
            authenticator,
            clock,
            metrics: None,
            original_hosts,
            settings,
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Report reset counts, live-host gauges and per-host docs-sent counters
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    pub fn original_hosts(&self) -> &[HostKey] {
        &self.original_hosts
    }

    /// Build the initial table from the configured host list.
    ///
    /// # Errors
    /// Fails when no host could be authenticated.
    pub fn initialize(&self) -> Result<()> {
        let table = self.establish_all(&self.original_hosts)?;
        info!(live = table.len(), configured = self.original_hosts.len(), "Sessions established");
        self.store.replace_all(table)?;
        self.report_live_hosts();
        Ok(())
    }

    /// Authenticate every distinct host independently.
    ///
    /// Per-host failures are logged and skipped.
    ///
    /// # Errors
    /// Fails only if every host failed, with the last observed error, or
    /// with [`IngestError::NoEndpoints`] if no error was observed.
    pub fn establish_all(&self, hosts: &[HostKey]) -> Result<SessionTable> {
        let mut seen = HashSet::new();
        let mut table = SessionTable::new();
        let mut last_error = None;

        for host in hosts.iter().filter(|host| seen.insert(*host)) {
            match self.establish_one(host) {
                Ok(session) => {
                    table.insert(session);
                }
                Err(err) => {
                    warn!(host = %host, error = %err, "Failed to establish session; skipping host");
                    last_error = Some(err);
                }
            }
        }

        if table.is_empty() {
            return Err(last_error.unwrap_or_else(|| IngestError::NoEndpoints {
                hosts: hosts.iter().map(HostKey::as_str).collect::<Vec<_>>().join(","),
            }));
        }
        Ok(table)
    }

    /// Log in to one host and stamp a fresh session
    pub fn establish_one(&self, host: &HostKey) -> Result<Session> {
        self.authenticator.login(host, &self.store)?;
        let meter = self.metrics.as_ref().map(|metrics| DocsSentMeter::new(host, Arc::clone(metrics)));
        Ok(Session::new(host.clone(), self.clock.now(), meter))
    }

    /// Re-establish the session for `host`.
    ///
    /// On success the entry is replaced; on failure the host is removed from
    /// the table and `None` is returned.
    ///
    /// # Errors
    /// Only [`IngestError::Shutdown`] once the store is closed.
    pub fn reset(&self, host: &HostKey) -> Result<Option<Session>> {
        if self.store.is_closed() {
            return Err(IngestError::Shutdown);
        }

        match self.establish_one(host) {
            Ok(session) => {
                self.store.put(session.clone())?;
                info!(host = %host, "Session re-established");
                self.report_reset(host, "success");
                Ok(Some(session))
            }
            Err(err) => {
                self.store.evict(host)?;
                warn!(host = %host, error = %err, "Session reset failed; host removed from rotation");
                self.report_reset(host, "failure");
                Ok(None)
            }
        }
    }

    /// Current session for `host`, resetting it first when it is missing or
    /// has been idle longer than the configured threshold.
    ///
    /// # Errors
    /// [`IngestError::HostInactive`] if the session cannot be re-established.
    pub fn get(&self, host: &HostKey, request_id: u64) -> Result<Session> {
        let threshold = self.settings.idle_threshold();
        let fresh = match self.store.session(host)? {
            Some(session) if !session.is_expired(self.clock.now(), threshold) => {
                return Ok(session);
            }
            Some(session) => {
                info!(
                    host = %host,
                    request_id,
                    age_secs = session.age(self.clock.now()).as_secs(),
                    "Session idle past threshold; re-establishing"
                );
                self.reset(host)?
            }
            None => {
                info!(host = %host, request_id, "No session for host; establishing");
                self.reset(host)?
            }
        };

        fresh.ok_or_else(|| IngestError::HostInactive { host: host.to_string(), request_id })
    }

    /// Snapshot of live hosts, rebuilding the table from the original host
    /// list after the outage delay when it has drained to empty.
    ///
    /// # Errors
    /// [`IngestError::TotalOutage`] if the rebuild establishes nothing.
    pub fn live_hosts(&self) -> Result<Vec<HostKey>> {
        let hosts = self.store.live_hosts()?;
        if !hosts.is_empty() {
            return Ok(hosts);
        }

        let _rebuild = self.rebuild_lock.lock();
        let hosts = self.store.live_hosts()?;
        if !hosts.is_empty() {
            return Ok(hosts);
        }

        let delay = self.settings.outage_recovery_delay();
        warn!(delay_ms = delay.as_millis() as u64, "No live hosts; rebuilding sessions after delay");
        self.clock.sleep(delay);

        match self.establish_all(&self.original_hosts) {
            Ok(table) => {
                info!(live = table.len(), "Session table rebuilt after outage");
                self.store.replace_all(table)?;
                self.report_live_hosts();
                self.store.live_hosts()
            }
            Err(err) => {
                error!(error = %err, "Every configured host failed to re-establish a session");
                Err(IngestError::TotalOutage { cause: Box::new(err) })
            }
        }
    }

    pub fn snapshot(&self) -> Result<Vec<SessionInfo>> {
        self.store.snapshot(self.clock.now())
    }

    /// Close the store; `false` if it was already closed
    pub fn shutdown(&self) -> bool {
        self.store.close()
    }

    fn report_reset(&self, host: &HostKey, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.increment_counter(
                METRIC_SESSION_RESETS,
                &[("host", host.as_str()), ("outcome", outcome)],
            );
        }
        self.report_live_hosts();
    }

    fn report_live_hosts(&self) {
        if let (Some(metrics), Ok(live)) = (&self.metrics, self.store.len()) {
            metrics.record_gauge(METRIC_LIVE_HOSTS, live as f64, &[]);
        }
    }
}
