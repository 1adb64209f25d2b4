//! Mock clock for deterministic tests
//!
//! `sleep` returns immediately after advancing virtual time and recording the
//! requested duration, so backoff delays can be asserted without waiting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::time::Clock;

#[derive(Debug, Default)]
struct MockClockState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

/// Mock clock for deterministic testing
///
/// Clones share the same virtual timeline.
///
/// ```
/// # #[cfg(feature = "test-utils")]
/// # {
/// use std::time::Duration;
///
/// use ingestlink_common::testing::MockClock;
/// use ingestlink_common::Clock;
///
/// let clock = MockClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(600));
/// assert_eq!(clock.now().duration_since(start), Duration::from_secs(600));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    state: Arc<Mutex<MockClockState>>,
}

impl MockClock {
    /// Create a new mock clock anchored at the current real instant
    pub fn new() -> Self {
        Self { start: Instant::now(), state: Arc::new(Mutex::new(MockClockState::default())) }
    }

    /// Advance the mock clock by a duration without recording a sleep
    pub fn advance(&self, duration: Duration) {
        self.state.lock().elapsed += duration;
    }

    /// Total virtual time elapsed since creation
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Every duration passed to [`Clock::sleep`], in call order
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.state.lock().elapsed
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.elapsed += duration;
        state.sleeps.push(duration);
    }
}
