//! Time utilities
//!
//! Provides the `Clock` abstraction used by every component that needs the
//! current time or schedules work against it.

mod clock;

pub use clock::{Clock, MockClock, SystemClock};
