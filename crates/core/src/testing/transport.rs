use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use ingestlink_domain::{IngestError, Result};

use crate::transport::{Transport, TransportRequest, TransportResponse};

/// A canned outcome for one request
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Reply { status: u16, body: String, headers: Vec<(String, String)> },
    /// Body stream fails on first read
    UnreadableBody { status: u16 },
    /// Connection-level failure
    NetworkError(String),
}

impl ScriptedResponse {
    pub fn status(status: u16) -> Self {
        Self::Reply { status, body: String::new(), headers: Vec::new() }
    }

    pub fn ok() -> Self {
        Self::status(200)
    }

    pub fn unreadable_body(status: u16) -> Self {
        Self::UnreadableBody { status }
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self::NetworkError(message.into())
    }

    pub fn with_body(mut self, text: impl Into<String>) -> Self {
        if let Self::Reply { body, .. } = &mut self {
            *body = text.into();
        }
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Reply { headers, .. } = &mut self {
            headers.push((name.into(), value.into()));
        }
        self
    }

    fn into_result(self, url: &str) -> Result<TransportResponse> {
        match self {
            Self::Reply { status, body, headers } => {
                Ok(TransportResponse::from_bytes(status, headers, body))
            }
            Self::UnreadableBody { status } => {
                Ok(TransportResponse::new(status, Vec::new(), Box::new(FailingBody)))
            }
            Self::NetworkError(message) => {
                Err(IngestError::Transport { endpoint: url.to_string(), message })
            }
        }
    }
}

struct FailingBody;

impl Read for FailingBody {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset while reading body"))
    }
}

#[derive(Debug)]
struct Route {
    prefix: String,
    queue: VecDeque<ScriptedResponse>,
    fallback: Option<ScriptedResponse>,
}

impl Route {
    fn next(&mut self) -> Option<ScriptedResponse> {
        self.queue.pop_front().or_else(|| self.fallback.clone())
    }
}

/// In-memory [`Transport`] driven by scripted responses.
///
/// Routes match by URL prefix; among matching routes the longest prefix
/// with a response available wins. One-shot responses are consumed in
/// order before the route's standing response. A request that matches
/// nothing fails with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<TransportRequest>>,
    closed: AtomicBool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_route(&self, prefix: &str, f: impl FnOnce(&mut Route)) {
        let mut routes = self.routes.lock();
        let index = match routes.iter().position(|route| route.prefix == prefix) {
            Some(index) => index,
            None => {
                routes.push(Route {
                    prefix: prefix.to_string(),
                    queue: VecDeque::new(),
                    fallback: None,
                });
                routes.len() - 1
            }
        };
        f(&mut routes[index]);
    }

    /// Queue a one-shot response for URLs starting with `prefix`
    pub fn respond(&self, prefix: &str, response: ScriptedResponse) {
        self.with_route(prefix, |route| route.queue.push_back(response));
    }

    /// Standing response for URLs starting with `prefix`, used once the
    /// one-shot queue is empty
    pub fn always(&self, prefix: &str, response: ScriptedResponse) {
        self.with_route(prefix, |route| route.fallback = Some(response));
    }

    /// Every request executed so far
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    /// Requests whose URL starts with `prefix`
    pub fn requests_to(&self, prefix: &str) -> Vec<TransportRequest> {
        self.requests.lock().iter().filter(|r| r.url.starts_with(prefix)).cloned().collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests.lock().iter().filter(|r| r.url.starts_with(prefix)).count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().push(request.clone());

        let scripted = {
            let mut routes = self.routes.lock();
            let mut candidates: Vec<&mut Route> =
                routes.iter_mut().filter(|route| request.url.starts_with(&route.prefix)).collect();
            candidates.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
            candidates.into_iter().find_map(Route::next)
        };

        match scripted {
            Some(response) => response.into_result(&request.url),
            None => Err(IngestError::Transport {
                endpoint: request.url.clone(),
                message: "no scripted response".to_string(),
            }),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_prefix_wins_and_queue_precedes_fallback() {
        let transport = ScriptedTransport::new();
        transport.always("http://a:1", ScriptedResponse::status(204));
        transport.always("http://a:1/api/session", ScriptedResponse::status(201));
        transport.respond("http://a:1/api/session", ScriptedResponse::status(401));

        let login = TransportRequest::post("http://a:1/api/session?realmName=x");
        assert_eq!(transport.execute(&login).unwrap().status(), 401);
        assert_eq!(transport.execute(&login).unwrap().status(), 201);
        let post = TransportRequest::post("http://a:1/pipe");
        assert_eq!(transport.execute(&post).unwrap().status(), 204);

        assert_eq!(transport.count("http://a:1/api/session"), 2);
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn test_exhausted_longer_route_falls_back_to_shorter() {
        let transport = ScriptedTransport::new();
        transport.always("http://a:1", ScriptedResponse::ok());
        transport.respond("http://a:1/pipe", ScriptedResponse::status(500));

        let post = TransportRequest::post("http://a:1/pipe");
        assert_eq!(transport.execute(&post).unwrap().status(), 500);
        assert_eq!(transport.execute(&post).unwrap().status(), 200);
    }

    #[test]
    fn test_unmatched_and_network_errors() {
        let transport = ScriptedTransport::new();
        transport.respond("http://a:1", ScriptedResponse::network_error("refused"));

        let request = TransportRequest::get("http://a:1/x");
        assert!(matches!(transport.execute(&request), Err(IngestError::Transport { .. })));
        assert!(matches!(transport.execute(&request), Err(IngestError::Transport { .. })));
        transport.close();
        assert!(transport.is_closed());
    }
}
