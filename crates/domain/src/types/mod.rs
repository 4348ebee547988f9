//! Domain types and models

mod appointment;
mod availability;
mod participant;
mod reminder;
mod request;
mod time;

pub use appointment::{Appointment, AppointmentStatus, Medium, TransitionEvent};
pub use availability::{AvailabilityWindow, DayOfWeek, RecurrenceRule, WindowState};
pub use participant::{ClientProfile, ConfirmationPolicy, ProfessionalProfile, ReschedulePolicy};
pub use reminder::{NotificationKind, ReminderEvent};
pub use request::{AppointmentQuery, BookingRequest, CancelRequest, RescheduleRequest};
pub use time::{Slot, TimeRange};
