//! Production wiring for [`PipelineClient`]

use std::sync::Arc;

use ingestlink_core::{PipelineClient, PipelineClientBuilder};
use ingestlink_domain::{ClientConfig, Result};
use tracing::info;

use crate::config;
use crate::http::ReqwestTransport;
use crate::observability::{describe_metrics, MetricsCrateCollector};

/// Builder preloaded with a [`ReqwestTransport`] and, when
/// `metrics_enabled` is set, the `metrics` facade collector.
///
/// Use this instead of [`connect`] to inject a clock or a seeded random
/// source before building.
///
/// # Errors
/// Returns `IngestError::Config` if the HTTP client cannot be built.
pub fn client_builder(config: ClientConfig) -> Result<PipelineClientBuilder> {
    let transport = ReqwestTransport::from_config(&config.transport)?;
    let metrics_enabled = config.metrics_enabled;

    let mut builder = PipelineClient::builder(config).transport(Arc::new(transport));
    if metrics_enabled {
        describe_metrics();
        builder = builder.metrics(Arc::new(MetricsCrateCollector::new()));
    }
    Ok(builder)
}

/// Build a client for `config` and establish sessions with every host.
///
/// # Errors
/// Configuration errors, or the last login error if no host authenticates.
pub fn connect(config: ClientConfig) -> Result<PipelineClient> {
    client_builder(config)?.build()
}

/// [`connect`] using configuration from the environment or a config file.
///
/// # Errors
/// See [`config::load`] and [`connect`].
pub fn connect_from_env() -> Result<PipelineClient> {
    let config = config::load()?;
    info!(hosts = config.hosts.len(), "Connecting with loaded configuration");
    connect(config)
}
