//! Deterministic doubles for the core ports
//!
//! - [`ScriptedTransport`]: canned responses routed by URL prefix, with a
//!   request log
//! - [`FixedIndexSource`]: a random source that replays given indices

mod random;
mod transport;

pub use ingestlink_common::testing::{MetricEvent, MockClock, RecordingMetricsCollector};
pub use random::FixedIndexSource;
pub use transport::{ScriptedResponse, ScriptedTransport};
