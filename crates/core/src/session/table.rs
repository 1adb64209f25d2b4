//! Session values and the host-keyed session table

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ingestlink_common::MetricsCollector;
use ingestlink_domain::constants::METRIC_DOCS_SENT;
use ingestlink_domain::HostKey;

/// Per-host handle for the documents-sent counter
#[derive(Debug, Clone)]
pub struct DocsSentMeter {
    host: String,
    collector: Arc<dyn MetricsCollector>,
}

impl DocsSentMeter {
    pub fn new(host: &HostKey, collector: Arc<dyn MetricsCollector>) -> Self {
        Self { host: host.to_string(), collector }
    }

    pub fn mark(&self, documents: usize) {
        self.collector.increment_counter_by(
            METRIC_DOCS_SENT,
            documents as u64,
            &[("host", self.host.as_str())],
        );
    }
}

/// An established session with one host.
///
/// Immutable; a reset produces a new value.
#[derive(Debug, Clone)]
pub struct Session {
    host: HostKey,
    established_at: Instant,
    docs_sent: Option<DocsSentMeter>,
}

impl Session {
    pub fn new(host: HostKey, established_at: Instant, docs_sent: Option<DocsSentMeter>) -> Self {
        Self { host, established_at, docs_sent }
    }

    pub fn host(&self) -> &HostKey {
        &self.host
    }

    pub fn established_at(&self) -> Instant {
        self.established_at
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.established_at)
    }

    /// A session is expired once its age strictly exceeds `threshold`
    pub fn is_expired(&self, now: Instant, threshold: Duration) -> bool {
        self.age(now) > threshold
    }

    /// Count `documents` against this host's docs-sent metric, if any
    pub fn mark_sent(&self, documents: usize) {
        if let Some(meter) = &self.docs_sent {
            meter.mark(documents);
        }
    }
}

/// Read-only view of one table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub host: HostKey,
    pub age: Duration,
}

/// Ordered mapping from host key to its current session
#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    sessions: BTreeMap<HostKey, Session>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for the session's host
    pub fn insert(&mut self, session: Session) -> Option<Session> {
        self.sessions.insert(session.host.clone(), session)
    }

    pub fn get(&self, host: &HostKey) -> Option<&Session> {
        self.sessions.get(host)
    }

    pub fn remove(&mut self, host: &HostKey) -> Option<Session> {
        self.sessions.remove(host)
    }

    /// Host keys in ascending order
    pub fn hosts(&self) -> Vec<HostKey> {
        self.sessions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn snapshot(&self, now: Instant) -> Vec<SessionInfo> {
        self.iter()
            .map(|session| SessionInfo { host: session.host.clone(), age: session.age(now) })
            .collect()
    }
}

impl FromIterator<Session> for SessionTable {
    fn from_iter<I: IntoIterator<Item = Session>>(iter: I) -> Self {
        let mut table = Self::new();
        for session in iter {
            table.insert(session);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use ingestlink_common::testing::RecordingMetricsCollector;

    use super::*;

    fn key(s: &str) -> HostKey {
        HostKey::parse(s).unwrap()
    }

    #[test]
    fn test_expiry_is_strictly_greater_than_threshold() {
        let start = Instant::now();
        let session = Session::new(key("a:1"), start, None);
        let threshold = Duration::from_secs(599);

        assert!(!session.is_expired(start + Duration::from_secs(599), threshold));
        assert!(session.is_expired(start + Duration::from_secs(600), threshold));
    }

    #[test]
    fn test_hosts_are_sorted_and_deduplicated() {
        let now = Instant::now();
        let table: SessionTable = ["c:1", "a:1", "http://c:1/"]
            .into_iter()
            .map(|h| Session::new(key(h), now, None))
            .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.hosts(), vec![key("a:1"), key("c:1")]);
    }

    #[test]
    fn test_mark_sent_reports_to_meter() {
        let collector = RecordingMetricsCollector::new();
        let host = key("a:1");
        let meter = DocsSentMeter::new(&host, Arc::new(collector.clone()));
        let session = Session::new(host, Instant::now(), Some(meter));

        session.mark_sent(25);
        session.mark_sent(5);

        assert_eq!(collector.counter_total(METRIC_DOCS_SENT, &[("host", "http://a:1")]), 30);
    }

    #[test]
    fn test_snapshot_reports_age() {
        let start = Instant::now();
        let mut table = SessionTable::new();
        table.insert(Session::new(key("a:1"), start, None));

        let snapshot = table.snapshot(start + Duration::from_secs(42));
        assert_eq!(snapshot, vec![SessionInfo { host: key("a:1"), age: Duration::from_secs(42) }]);
    }
}
