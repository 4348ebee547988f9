//! Wall-clock abstraction for testability
//!
//! Components never call `Utc::now()` directly; they hold an `Arc<dyn Clock>`
//! so tests can substitute a `MockClock` and drive time deterministically.
//!
//! # Examples
//!
//! ```
//! use chrono::Duration;
//!
//! use carebook_common::time::{Clock, MockClock, SystemClock};
//!
//! // Use the system clock in production
//! let clock = SystemClock;
//! let _now = clock.now();
//!
//! // Use a mock clock in tests
//! let mock = MockClock::new();
//! let start = mock.now();
//! mock.advance(Duration::minutes(5));
//! assert_eq!(mock.now() - start, Duration::minutes(5));
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Trait for reading the current wall-clock time
pub trait Clock: Send + Sync {
    /// Get the current time as UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock implementation
///
/// Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for deterministic testing
///
/// Starts at a fixed base time and only moves when advanced. Clones share
/// the same underlying time, so a clock handed to a service under test can
/// still be driven from the test body.
#[derive(Debug, Clone)]
pub struct MockClock {
    base: DateTime<Utc>,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a mock clock starting at the current real time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a mock clock starting at a specific instant
    pub fn at(base: DateTime<Utc>) -> Self {
        Self { base, elapsed: Arc::new(Mutex::new(Duration::zero())) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        let mut elapsed = self.elapsed.lock();
        *elapsed += duration;
    }

    /// Jump the mock clock to an absolute instant
    ///
    /// Jumping backwards is allowed; the clock simply reports the new time.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut elapsed = self.elapsed.lock();
        *elapsed = instant - self.base;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.base + *self.elapsed.lock()
    }
}
