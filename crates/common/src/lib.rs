//! Shared runtime seams for ingestlink crates.
//!
//! - [`time`]: the `Clock` abstraction used for idle checks and backoff
//!   sleeps
//! - [`observability`]: the `MetricsCollector` trait and a no-op collector
//! - [`testing`]: deterministic doubles (feature `test-utils`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod observability;
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use observability::{MetricsCollector, NoOpMetricsCollector};
pub use time::{Clock, SystemClock};
