//! Reminder events and notification kinds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of notifications the engine emits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
    Confirmed,
    Cancelled,
    Rescheduled,
}

/// A scheduled reminder for an appointment
///
/// One event exists per configured offset. Events are invalidated when the
/// appointment is cancelled and re-armed against the new start when it is
/// rescheduled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderEvent {
    pub appointment_id: Uuid,
    /// Reminder recipient
    pub client_id: Uuid,
    pub fires_at: DateTime<Utc>,
    pub offset: std::time::Duration,
    pub delivered: bool,
}
