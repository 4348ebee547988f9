//! Domain constants
//!
//! Centralized location for engine-level defaults.

use std::time::Duration;

// Lifecycle defaults
pub const DEFAULT_NO_SHOW_GRACE: Duration = Duration::from_secs(15 * 60);
pub const RETENTION_WINDOW: Duration = Duration::from_secs(90 * 24 * 60 * 60);

// Notification delivery
pub const NOTIFY_MAX_ATTEMPTS: u32 = 5;
pub const NOTIFY_INITIAL_BACKOFF_MS: u64 = 200;
pub const NOTIFY_MAX_BACKOFF_SECS: u64 = 30;

// Background loop cadence
pub const REMINDER_POLL_INTERVAL_SECS: u64 = 30;
pub const LIFECYCLE_SWEEP_INTERVAL_SECS: u64 = 60;
