//! `metrics` facade collector

use ingestlink_common::MetricsCollector;
use ingestlink_domain::constants::{
    METRIC_DOCS_SENT, METRIC_LIVE_HOSTS, METRIC_POST_DURATION, METRIC_SESSION_RESETS,
};
use metrics::{Label, Unit};

/// Forwards client metrics to whatever recorder is installed for the
/// `metrics` crate. With no recorder installed every call is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCrateCollector;

impl MetricsCrateCollector {
    pub fn new() -> Self {
        Self
    }
}

fn to_labels(labels: &[(&str, &str)]) -> Vec<Label> {
    labels.iter().map(|(key, value)| Label::new(key.to_string(), value.to_string())).collect()
}

impl MetricsCollector for MetricsCrateCollector {
    fn increment_counter_by(&self, name: &str, value: u64, labels: &[(&str, &str)]) {
        metrics::counter!(name.to_string(), to_labels(labels)).increment(value);
    }

    fn record_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        metrics::gauge!(name.to_string(), to_labels(labels)).set(value);
    }

    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        metrics::histogram!(name.to_string(), to_labels(labels)).record(value);
    }
}

/// Register units and descriptions for the client's metrics with the
/// installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!(
        METRIC_DOCS_SENT,
        Unit::Count,
        "Documents accepted by each host's pipeline"
    );
    metrics::describe_counter!(
        METRIC_SESSION_RESETS,
        Unit::Count,
        "Session re-establishment attempts per host and outcome"
    );
    metrics::describe_gauge!(METRIC_LIVE_HOSTS, Unit::Count, "Hosts with a live session");
    metrics::describe_histogram!(
        METRIC_POST_DURATION,
        Unit::Milliseconds,
        "Wall time of a batch submission including retries"
    );
}

#[cfg(test)]
mod tests {
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;

    #[test]
    fn test_collector_feeds_installed_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            let collector = MetricsCrateCollector::new();
            collector.increment_counter_by(METRIC_DOCS_SENT, 3, &[("host", "http://a:1")]);
            collector.increment_counter(METRIC_DOCS_SENT, &[("host", "http://a:1")]);
            collector.record_gauge(METRIC_LIVE_HOSTS, 2.0, &[]);
            collector.record_timing(METRIC_POST_DURATION, 15, &[("outcome", "success")]);
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"ingestlink_docs_sent_total{host="http://a:1"} 4"#));
        assert!(rendered.contains("ingestlink_live_hosts 2"));
        assert!(rendered.contains("ingestlink_batch_post_duration_ms"));
    }

    #[test]
    fn test_collector_without_recorder_is_noop() {
        let collector = MetricsCrateCollector::new();
        collector.increment_counter(METRIC_SESSION_RESETS, &[("host", "a"), ("outcome", "ok")]);
        collector.record_histogram(METRIC_POST_DURATION, 1.0, &[]);
    }
}
