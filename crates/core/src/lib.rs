//! # Carebook Core
//!
//! Pure scheduling logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The appointment ledger and its no-overlap guarantee
//! - Slot allocation over availability windows
//! - The booking coordinator orchestrating the end-to-end protocol
//! - Reminder queueing and exactly-once firing
//! - Port/adapter interfaces (traits) for external collaborators
//!
//! ## Architecture Principles
//! - Only depends on `carebook-common` and `carebook-domain`
//! - No transport, storage, or platform code
//! - All external collaborators reached via traits
//! - Pure, testable scheduling logic

pub mod reminders;
pub mod scheduling;

// Re-export specific items to avoid ambiguity
pub use reminders::ReminderService;
pub use scheduling::coordinator::{BookingCoordinator, SweepReport};
pub use scheduling::ledger::{AppointmentLedger, NewAppointment};
pub use scheduling::ports::{AvailabilityStore, Notifier, ParticipantDirectory};
pub use scheduling::slots::{SlotAllocator, SlotIter};
