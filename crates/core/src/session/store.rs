//! Lock-guarded session state
//!
//! The session table and the cookie jar share one mutex. The lock is only
//! held for in-memory reads and writes, never across a network call; callers
//! receive cloned snapshots.

use std::time::Instant;

use parking_lot::Mutex;

use ingestlink_domain::{HostKey, IngestError, Result};

use super::cookies::{url_path, CookieJar};
use super::table::{Session, SessionInfo, SessionTable};
use crate::transport::{TransportRequest, TransportResponse};

#[derive(Debug)]
struct StoreState {
    /// `None` once the store has been closed
    table: Option<SessionTable>,
    cookies: CookieJar,
}

/// Shared, thread-safe home of the session table and cookie jar
#[derive(Debug)]
pub struct SessionStore {
    state: Mutex<StoreState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                table: Some(SessionTable::new()),
                cookies: CookieJar::new(),
            }),
        }
    }

    fn with_table<T>(&self, f: impl FnOnce(&mut SessionTable) -> T) -> Result<T> {
        let mut state = self.state.lock();
        state.table.as_mut().map(f).ok_or(IngestError::Shutdown)
    }

    /// Snapshot of live host keys in ascending order
    pub fn live_hosts(&self) -> Result<Vec<HostKey>> {
        self.with_table(|table| table.hosts())
    }

    pub fn session(&self, host: &HostKey) -> Result<Option<Session>> {
        self.with_table(|table| table.get(host).cloned())
    }

    /// Insert or replace the session for its host
    pub fn put(&self, session: Session) -> Result<()> {
        self.with_table(|table| {
            table.insert(session);
        })
    }

    pub fn evict(&self, host: &HostKey) -> Result<Option<Session>> {
        self.with_table(|table| table.remove(host))
    }

    /// Swap in a freshly built table
    pub fn replace_all(&self, sessions: SessionTable) -> Result<()> {
        self.with_table(|table| *table = sessions)
    }

    pub fn len(&self) -> Result<usize> {
        self.with_table(|table| table.len())
    }

    pub fn snapshot(&self, now: Instant) -> Result<Vec<SessionInfo>> {
        self.with_table(|table| table.snapshot(now))
    }

    /// Clear all state and reject further table access.
    ///
    /// Returns `false` if the store was already closed.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        state.cookies.clear();
        state.table.take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().table.is_none()
    }

    /// Forget cookies scoped to `host`
    pub fn clear_cookies(&self, host: &HostKey) -> usize {
        self.state.lock().cookies.clear_for_host(host.host())
    }

    /// Record every `Set-Cookie` header of a response from `host`
    pub fn capture_cookies(&self, host: &HostKey, response: &TransportResponse) {
        let mut values = response.header_values("set-cookie").peekable();
        if values.peek().is_none() {
            return;
        }
        let mut state = self.state.lock();
        for value in values {
            state.cookies.store(host.host(), value);
        }
    }

    /// Add a `Cookie` header to `request` if any stored cookie applies
    pub fn attach_cookies(&self, host: &HostKey, request: &mut TransportRequest) {
        let header = self.state.lock().cookies.header_value(host.host(), url_path(&request.url));
        if let Some(header) = header {
            request.set_header("Cookie", header);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> HostKey {
        HostKey::parse(s).unwrap()
    }

    #[test]
    fn test_put_evict_and_live_hosts() {
        let store = SessionStore::new();
        store.put(Session::new(key("b:1"), Instant::now(), None)).unwrap();
        store.put(Session::new(key("a:1"), Instant::now(), None)).unwrap();

        assert_eq!(store.live_hosts().unwrap(), vec![key("a:1"), key("b:1")]);
        assert!(store.evict(&key("a:1")).unwrap().is_some());
        assert_eq!(store.live_hosts().unwrap(), vec![key("b:1")]);
        assert!(store.session(&key("a:1")).unwrap().is_none());
    }

    #[test]
    fn test_closed_store_rejects_access() {
        let store = SessionStore::new();
        store.put(Session::new(key("a:1"), Instant::now(), None)).unwrap();

        assert!(store.close());
        assert!(!store.close());
        assert!(store.is_closed());
        assert!(matches!(store.live_hosts(), Err(IngestError::Shutdown)));
        assert!(matches!(
            store.put(Session::new(key("a:1"), Instant::now(), None)),
            Err(IngestError::Shutdown)
        ));
    }

    #[test]
    fn test_cookie_round_trip_through_responses() {
        let store = SessionStore::new();
        let host = key("node-1:8764");
        let response = TransportResponse::from_bytes(
            200,
            vec![("Set-Cookie".into(), "id=abc; Path=/".into())],
            "",
        );

        store.capture_cookies(&host, &response);
        let mut request = TransportRequest::post(host.join("/api/apollo/index"));
        store.attach_cookies(&host, &mut request);
        assert_eq!(request.header("cookie"), Some("id=abc"));

        assert_eq!(store.clear_cookies(&host), 1);
        let mut request = TransportRequest::post(host.join("/x"));
        store.attach_cookies(&host, &mut request);
        assert_eq!(request.header("cookie"), None);
    }
}
