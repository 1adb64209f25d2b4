//! Recording metrics collector

use std::sync::Arc;

use parking_lot::Mutex;

use crate::observability::MetricsCollector;

/// One metric emission captured by [`RecordingMetricsCollector`]
#[derive(Debug, Clone, PartialEq)]
pub enum MetricEvent {
    Counter { name: String, value: u64, labels: Vec<(String, String)> },
    Gauge { name: String, value: f64, labels: Vec<(String, String)> },
    Histogram { name: String, value: f64, labels: Vec<(String, String)> },
}

/// Collector that keeps every emitted metric in memory for assertions.
///
/// Clones share the same event log.
#[derive(Debug, Clone, Default)]
pub struct RecordingMetricsCollector {
    events: Arc<Mutex<Vec<MetricEvent>>>,
}

fn owned_labels(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    labels.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
}

fn labels_match(recorded: &[(String, String)], wanted: &[(&str, &str)]) -> bool {
    wanted.iter().all(|(k, v)| recorded.iter().any(|(rk, rv)| rk == k && rv == v))
}

impl RecordingMetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<MetricEvent> {
        self.events.lock().clone()
    }

    /// Sum of every counter increment named `name` whose labels include all
    /// of `labels`
    pub fn counter_total(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                MetricEvent::Counter { name: n, value, labels: l }
                    if n == name && labels_match(l, labels) =>
                {
                    Some(*value)
                }
                _ => None,
            })
            .sum()
    }

    /// Most recent gauge value recorded under `name`
    pub fn last_gauge(&self, name: &str) -> Option<f64> {
        self.events.lock().iter().rev().find_map(|event| match event {
            MetricEvent::Gauge { name: n, value, .. } if n == name => Some(*value),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl MetricsCollector for RecordingMetricsCollector {
    fn increment_counter_by(&self, name: &str, value: u64, labels: &[(&str, &str)]) {
        self.events.lock().push(MetricEvent::Counter {
            name: name.to_string(),
            value,
            labels: owned_labels(labels),
        });
    }

    fn record_gauge(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        self.events.lock().push(MetricEvent::Gauge {
            name: name.to_string(),
            value,
            labels: owned_labels(labels),
        });
    }

    fn record_histogram(&self, name: &str, value: f64, labels: &[(&str, &str)]) {
        self.events.lock().push(MetricEvent::Histogram {
            name: name.to_string(),
            value,
            labels: owned_labels(labels),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_total_filters_by_labels() {
        let collector = RecordingMetricsCollector::new();
        collector.increment_counter_by("docs", 3, &[("host", "a")]);
        collector.increment_counter_by("docs", 4, &[("host", "b")]);
        collector.increment_counter_by("docs", 5, &[("host", "a")]);

        assert_eq!(collector.counter_total("docs", &[("host", "a")]), 8);
        assert_eq!(collector.counter_total("docs", &[]), 12);
        assert_eq!(collector.counter_total("other", &[]), 0);
    }

    #[test]
    fn test_last_gauge() {
        let collector = RecordingMetricsCollector::new();
        assert_eq!(collector.last_gauge("live"), None);
        collector.record_gauge("live", 3.0, &[]);
        collector.record_gauge("live", 2.0, &[]);
        assert_eq!(collector.last_gauge("live"), Some(2.0));

        collector.clear();
        assert!(collector.events().is_empty());
    }
}
