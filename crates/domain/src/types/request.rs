//! Validated request structs for engine operations
//!
//! Every mutating operation takes an explicit request struct whose shape is
//! checked up front; nothing downstream re-validates field presence.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::appointment::{AppointmentStatus, Medium};
use super::time::TimeRange;
use crate::errors::{CarebookError, Result};

/// Request to book an appointment
///
/// The caller either supplies the exact `slot`, or a search `window` plus
/// `duration` and takes the earliest free slot the allocator finds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub professional_id: Uuid,
    pub client_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<std::time::Duration>,
    pub medium: Medium,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub reminder_offsets: Vec<std::time::Duration>,
}

impl BookingRequest {
    /// Check request shape
    pub fn validate(&self) -> Result<()> {
        match (&self.slot, &self.window, &self.duration) {
            (Some(_), None, None) => {}
            (None, Some(_), Some(duration)) => {
                if duration.is_zero() {
                    return Err(CarebookError::InvalidDuration(
                        "requested duration must be positive".to_string(),
                    ));
                }
            }
            (None, Some(_), None) => {
                return Err(CarebookError::InvalidInput(
                    "window search requires a duration".to_string(),
                ));
            }
            (Some(_), _, _) => {
                return Err(CarebookError::InvalidInput(
                    "supply either an exact slot or a search window, not both".to_string(),
                ));
            }
            (None, None, _) => {
                return Err(CarebookError::InvalidInput(
                    "supply an exact slot or a search window".to_string(),
                ));
            }
        }

        if self.medium == Medium::InPerson
            && self.location.as_deref().map_or(true, |l| l.trim().is_empty())
        {
            return Err(CarebookError::InvalidInput(
                "in-person appointments require a location".to_string(),
            ));
        }

        if self.reminder_offsets.iter().any(std::time::Duration::is_zero) {
            return Err(CarebookError::InvalidInput(
                "reminder offsets must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Request to move an appointment to a new interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub appointment_id: Uuid,
    pub new_slot: TimeRange,
}

/// Request to cancel an appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    pub appointment_id: Uuid,
    pub reason: String,
}

impl CancelRequest {
    /// Check request shape
    pub fn validate(&self) -> Result<()> {
        if self.reason.trim().is_empty() {
            return Err(CarebookError::InvalidInput(
                "cancellation requires a reason".to_string(),
            ));
        }
        Ok(())
    }
}

/// Filter for appointment listings
///
/// Matches appointments where the participant is either side of the
/// appointment, optionally narrowed by status and date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentQuery {
    pub participant_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<TimeRange>,
}

impl AppointmentQuery {
    /// Match every appointment involving the participant
    pub fn for_participant(participant_id: Uuid) -> Self {
        Self { participant_id, status: None, range: None }
    }

    /// Narrow to a status
    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Narrow to appointments overlapping a range
    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = Some(range);
        self
    }
}
