//! Port interfaces for the scheduling engine
//!
//! These traits define the boundaries between core scheduling logic and the
//! external collaborators the engine consults but never implements.

use async_trait::async_trait;
use carebook_domain::{
    ClientProfile, NotificationKind, ProfessionalProfile, Result, TimeRange,
};
use uuid::Uuid;

/// Read access to a professional's bookable time
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Open intervals for the professional within `range`
    ///
    /// Returned intervals are non-overlapping, sorted by start, clipped to
    /// `range`, with blocked windows already subtracted. Fails with
    /// `NotFound` for an unknown professional.
    async fn open_windows(&self, professional_id: Uuid, range: &TimeRange)
        -> Result<Vec<TimeRange>>;
}

/// Lookup of participants and their policies
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// Fetch a professional's record, `NotFound` if unknown
    async fn get_professional(&self, id: Uuid) -> Result<ProfessionalProfile>;

    /// Fetch a client's record, `NotFound` if unknown
    async fn get_client(&self, id: Uuid) -> Result<ClientProfile>;
}

/// Outbound notification transport
///
/// The engine owns when to notify, never how; delivery retries wrap
/// implementations of this trait rather than living behind it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification to a participant
    async fn notify(
        &self,
        participant_id: Uuid,
        appointment_id: Uuid,
        kind: NotificationKind,
    ) -> Result<()>;
}
