//! Background schedulers for automated engine upkeep
//!
//! Two interval-based loops drive the engine's time-dependent behaviour:
//! - Reminder pump (fires due reminders through the notification port)
//! - Lifecycle sweeper (resolves elapsed appointments, archives old ones)
//!
//! All schedulers follow the same runtime rules:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support

pub mod error;
pub mod lifecycle_scheduler;
pub mod reminder_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use lifecycle_scheduler::{LifecycleScheduler, LifecycleSchedulerConfig};
pub use reminder_scheduler::{ReminderScheduler, ReminderSchedulerConfig};
