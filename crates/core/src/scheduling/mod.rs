//! Booking, ledger, and slot allocation

pub mod coordinator;
pub mod ledger;
pub mod ports;
pub mod slots;

pub use coordinator::{BookingCoordinator, SweepReport};
pub use ledger::{AppointmentLedger, NewAppointment};
pub use slots::{SlotAllocator, SlotIter};
