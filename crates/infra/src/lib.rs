//! # Carebook Infra
//!
//! Adapters and runtime plumbing around the core engine.
//!
//! This crate contains:
//! - In-memory implementations of the availability and directory ports
//! - Notification adapters (logging transport, retrying decorator)
//! - Background schedulers (reminder pump, lifecycle sweeper) with explicit
//!   start/stop lifecycle
//!
//! ## Architecture
//! - Implements the ports defined in `carebook-core`
//! - Owns all tokio task lifecycles; core stays runtime-agnostic

pub mod notify;
pub mod scheduling;
pub mod stores;

pub use notify::{LoggingNotifier, RetryingNotifier};
pub use scheduling::{
    LifecycleScheduler, LifecycleSchedulerConfig, ReminderScheduler, ReminderSchedulerConfig,
    SchedulerError, SchedulerResult,
};
pub use stores::{InMemoryAvailabilityStore, InMemoryDirectory};
