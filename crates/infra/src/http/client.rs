use std::time::Duration;

use ingestlink_core::transport::{Method, Transport, TransportRequest, TransportResponse};
use ingestlink_domain::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_IDLE_PER_HOST, DEFAULT_TIMEOUT_SECS,
};
use ingestlink_domain::{IngestError, Result, TransportConfig};
use parking_lot::RwLock;
use reqwest::blocking::Client as ReqwestClient;
use tracing::debug;

use crate::errors::InfraError;

/// Pooled, thread-safe [`Transport`] over `reqwest::blocking`.
///
/// Must be built and dropped outside of an async runtime context.
/// Cookies are managed by the session store, so the reqwest cookie store is
/// left disabled.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: RwLock<Option<ReqwestClient>>,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Transport configured from the `[transport]` config section
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .max_idle_per_host(config.max_idle_per_host)
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }

    fn current_client(&self, url: &str) -> Result<ReqwestClient> {
        self.client.read().clone().ok_or_else(|| IngestError::Transport {
            endpoint: url.to_string(),
            message: "transport has been closed".to_string(),
        })
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let client = self.current_client(&request.url)?;

        let mut builder = client.request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "sending HTTP request");
        let response = builder.send().map_err(|err| IngestError::from(InfraError::from(err)))?;

        let status = response.status().as_u16();
        debug!(method = %request.method, url = %request.url, status, "received HTTP response");

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        Ok(TransportResponse::new(status, headers, Box::new(response)))
    }

    fn close(&self) {
        if self.client.write().take().is_some() {
            debug!("HTTP transport closed");
        }
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug)]
pub struct ReqwestTransportBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    max_idle_per_host: usize,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}

impl ReqwestTransportBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Disable certificate verification. Only for test clusters with
    /// self-signed certificates.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> Result<ReqwestTransport> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(self.max_idle_per_host)
            .danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            IngestError::Config(format!("failed to build HTTP client: {err}"))
        })?;
        Ok(ReqwestTransport { client: RwLock::new(Some(client)) })
    }
}
