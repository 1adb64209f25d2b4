//! Shared fixtures for infra integration tests
//!
//! Wiremock servers run on a dedicated tokio runtime; the blocking client
//! under test is always driven from the test thread, outside of that
//! runtime.

use std::net::TcpListener;

use ingestlink_domain::{ClientConfig, SessionConfig};
use tokio::runtime::Runtime;
use wiremock::MockServer;

pub const PIPELINE_PATH: &str = "/api/apollo/index-pipelines/docs/collections/docs/index";
pub const DOC_CONTENT_TYPE: &str = "application/vnd.lucidworks-document; charset=UTF-8";

/// Runtime hosting the mock servers
pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("tokio runtime should build")
}

pub fn start_server(rt: &Runtime) -> MockServer {
    rt.block_on(MockServer::start())
}

/// Session settings with short delays so retries do not slow the suite
pub fn fast_session() -> SessionConfig {
    SessionConfig {
        outage_recovery_delay_ms: 10,
        single_host_retry_delay_ms: 10,
        ..SessionConfig::default()
    }
}

/// Anonymous configuration over the given servers
pub fn config_for(servers: &[&MockServer]) -> ClientConfig {
    let hosts = servers.iter().map(|server| server.uri()).collect::<Vec<_>>().join(",");
    ClientConfig::new(&hosts).with_session(fast_session())
}

/// Number of requests `server` received on `path`
pub fn hits(rt: &Runtime, server: &MockServer, path: &str) -> usize {
    rt.block_on(server.received_requests())
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == path)
        .count()
}

/// Loopback address that refuses connections
pub fn closed_port_uri() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn documents(count: usize) -> Vec<serde_json::Value> {
    (0..count).map(|i| serde_json::json!({ "id": format!("doc-{i}"), "title": "hello" })).collect()
}
