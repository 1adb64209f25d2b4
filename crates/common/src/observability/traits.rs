//! Trait abstractions for metrics emission

use std::fmt::Debug;

/// Trait for metrics collection implementations
///
/// Allows components to emit metrics without depending on a specific
/// metrics collection system.
pub trait MetricsCollector: Send + Sync + Debug {
    /// Increment a counter by `value`
    fn increment_counter_by(&self, name: &str, value: u64, labels: &[(&str, &str)]);

    /// Increment a counter by one
    fn increment_counter(&self, name: &str, labels: &[(&str, &str)]) {
        self.increment_counter_by(name, 1, labels);
    }

    /// Record a gauge metric
    fn record_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]);

    /// Record a histogram metric
    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]);

    /// Record timing metric (in milliseconds)
    fn record_timing(&self, name: &str, duration_ms: u64, labels: &[(&str, &str)]) {
        self.record_histogram(name, duration_ms as f64, labels);
    }
}

/// No-op metrics collector used when metrics are disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetricsCollector;

impl MetricsCollector for NoOpMetricsCollector {
    fn increment_counter_by(&self, _name: &str, _value: u64, _labels: &[(&str, &str)]) {}

    fn record_gauge(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}

    fn record_histogram(&self, _name: &str, _value: f64, _labels: &[(&str, &str)]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MetricEvent, RecordingMetricsCollector};

    #[test]
    fn test_noop_collector_accepts_everything() {
        let collector = NoOpMetricsCollector;
        collector.increment_counter("requests", &[("host", "a")]);
        collector.record_gauge("live", 3.0, &[]);
        collector.record_timing("latency", 12, &[]);
    }

    #[test]
    fn test_default_methods_delegate() {
        let collector = RecordingMetricsCollector::new();
        collector.increment_counter("requests", &[("host", "a")]);
        collector.record_timing("latency", 12, &[]);

        assert_eq!(collector.counter_total("requests", &[("host", "a")]), 1);
        assert!(collector
            .events()
            .contains(&MetricEvent::Histogram { name: "latency".into(), value: 12.0, labels: vec![] }));
    }
}
