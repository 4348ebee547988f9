//! Appointment entity and its state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::time::TimeRange;
use crate::errors::{CarebookError, Result};

/// How the appointment is held
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Medium {
    Video,
    Phone,
    InPerson,
}

/// Appointment lifecycle states
///
/// `Cancelled`, `Completed` and `NoShow` are terminal; no transition leaves
/// them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Awaiting professional confirmation
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    /// Whether the state admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed | Self::NoShow)
    }

    /// Whether the appointment occupies its interval for overlap purposes
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

/// Events that drive the appointment state machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEvent {
    /// Professional acknowledges a pending appointment
    Confirm,
    /// Either party cancels; legal strictly before start
    Cancel { reason: String },
    /// Appointment ran to its end
    Complete,
    /// Grace period elapsed with no check-in
    MarkNoShow,
}

impl TransitionEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Cancel { .. } => "cancel",
            Self::Complete => "complete",
            Self::MarkNoShow => "mark_no_show",
        }
    }
}

/// A scheduled appointment between a client and a professional
///
/// Mutated only through [`Appointment::apply`] and the ledger's reschedule
/// path, so `last_modified_at` always tracks the latest change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub client_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub medium: Medium,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    /// Offsets before `start` at which reminders fire, largest first
    pub reminder_offsets: Vec<std::time::Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// The appointment's interval as a range
    pub fn span(&self) -> TimeRange {
        TimeRange { start: self.start, end: self.end }
    }

    /// Whether this appointment's interval overlaps the given range
    pub fn overlaps(&self, range: &TimeRange) -> bool {
        self.span().overlaps(range)
    }

    /// Apply a state-machine event
    ///
    /// Transitions out of a terminal state always fail with
    /// `InvalidTransition` and leave the appointment unchanged.
    pub fn apply(&mut self, event: TransitionEvent, now: DateTime<Utc>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(CarebookError::InvalidTransition(format!(
                "appointment {} is {:?}; cannot {}",
                self.id,
                self.status,
                event.name()
            )));
        }

        let next = match (self.status, &event) {
            (AppointmentStatus::Pending, TransitionEvent::Confirm) => AppointmentStatus::Confirmed,
            (AppointmentStatus::Pending | AppointmentStatus::Confirmed, TransitionEvent::Cancel { .. }) => {
                if now >= self.start {
                    return Err(CarebookError::InvalidTransition(format!(
                        "appointment {} already started; cancellation window closed",
                        self.id
                    )));
                }
                AppointmentStatus::Cancelled
            }
            (AppointmentStatus::Confirmed, TransitionEvent::Complete) => {
                AppointmentStatus::Completed
            }
            (AppointmentStatus::Confirmed, TransitionEvent::MarkNoShow) => AppointmentStatus::NoShow,
            (from, event) => {
                return Err(CarebookError::InvalidTransition(format!(
                    "appointment {} cannot {} from {from:?}",
                    self.id,
                    event.name()
                )));
            }
        };

        if let TransitionEvent::Cancel { reason } = event {
            self.cancel_reason = Some(reason);
        }
        self.status = next;
        self.last_modified_at = now;
        Ok(())
    }
}
