//! Observability seams
//!
//! Components emit metrics through [`MetricsCollector`] without depending on
//! a specific backend; the infra crate forwards to the `metrics` facade.

pub mod traits;

pub use traits::{MetricsCollector, NoOpMetricsCollector};
