//! Participant directory records and per-professional policies

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::DEFAULT_NO_SHOW_GRACE;

/// Whether a new booking needs the professional's acknowledgement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationPolicy {
    /// Bookings enter the ledger as `Confirmed`
    AutoConfirm,
    /// Bookings enter the ledger as `Pending`
    #[default]
    RequireConfirmation,
}

/// What happens to a confirmed appointment when the client reschedules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReschedulePolicy {
    /// The appointment keeps its `Confirmed` status at the new interval
    KeepConfirmed,
    /// The appointment returns to `Pending` until re-acknowledged
    #[default]
    RequireReconfirmation,
}

/// Directory record for a professional
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfessionalProfile {
    pub id: Uuid,
    pub confirmation_policy: ConfirmationPolicy,
    pub reschedule_policy: ReschedulePolicy,
    /// Window after an appointment's end during which a missing check-in
    /// resolves to `NoShow`
    pub no_show_grace: std::time::Duration,
}

impl ProfessionalProfile {
    /// Create a profile with default policies
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            confirmation_policy: ConfirmationPolicy::default(),
            reschedule_policy: ReschedulePolicy::default(),
            no_show_grace: DEFAULT_NO_SHOW_GRACE,
        }
    }

    /// Override the confirmation policy
    pub fn with_confirmation_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.confirmation_policy = policy;
        self
    }

    /// Override the reschedule policy
    pub fn with_reschedule_policy(mut self, policy: ReschedulePolicy) -> Self {
        self.reschedule_policy = policy;
        self
    }

    /// Override the no-show grace duration
    pub fn with_no_show_grace(mut self, grace: std::time::Duration) -> Self {
        self.no_show_grace = grace;
        self
    }
}

/// Directory record for a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientProfile {
    pub id: Uuid,
}
