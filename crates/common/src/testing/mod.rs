//! Testing utilities and helpers
//!
//! - **[`time`]**: a mock clock whose sleeps advance virtual time
//! - **[`metrics`]**: a collector that records every emitted metric
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::time::Duration;
//!
//! use ingestlink_common::testing::MockClock;
//! use ingestlink_common::Clock;
//!
//! let clock = MockClock::new();
//! clock.sleep(Duration::from_secs(2));
//! assert_eq!(clock.elapsed(), Duration::from_secs(2));
//! assert_eq!(clock.sleeps(), vec![Duration::from_secs(2)]);
//! # }
//! ```

pub mod metrics;
pub mod time;

pub use metrics::{MetricEvent, RecordingMetricsCollector};
pub use time::MockClock;
