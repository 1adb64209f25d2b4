//! Observability infrastructure for logging and metrics
//!
//! - [`logging`]: `tracing` subscriber installation (plain or JSON output)
//! - [`metrics`]: a [`ingestlink_common::MetricsCollector`] that forwards to
//!   the `metrics` facade, so any installed recorder (Prometheus, StatsD)
//!   receives client metrics

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, LogFormat};
pub use self::metrics::{describe_metrics, MetricsCrateCollector};
