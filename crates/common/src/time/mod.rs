//! Time abstraction
//!
//! Production code reads monotonic time and sleeps through a [`Clock`] so
//! that idle expiry and backoff delays can be driven by a mock in tests.

mod clock;

pub use clock::{Clock, SystemClock};
