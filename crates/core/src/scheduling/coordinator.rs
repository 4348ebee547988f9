//! Booking coordinator - end-to-end booking, reschedule, and cancel protocol
//!
//! Orchestrates the engine: request validation, policy lookup, slot
//! resolution, ledger commit, reminder arming, and best-effort notifications.
//! The ledger's per-professional boundary is where the no-overlap invariant
//! is enforced; the coordinator never holds it across an await.
//!
//! Notifications never affect the outcome of an operation: a committed
//! appointment is a durable fact regardless of what happens on the
//! notification path.

use std::sync::Arc;

use carebook_common::time::Clock;
use carebook_domain::constants::DEFAULT_NO_SHOW_GRACE;
use carebook_domain::{
    Appointment, AppointmentQuery, AppointmentStatus, BookingRequest, CancelRequest,
    CarebookError, ConfirmationPolicy, NotificationKind, RescheduleRequest, ReschedulePolicy,
    Result, Slot, TimeRange, TransitionEvent,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::ledger::{AppointmentLedger, NewAppointment};
use super::ports::{AvailabilityStore, Notifier, ParticipantDirectory};
use super::slots::SlotAllocator;
use crate::reminders::ReminderService;

/// Outcome of a lifecycle sweep across all professionals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub completed: usize,
    pub no_shows: usize,
}

/// Orchestrates booking operations over the ledger, allocator, and ports
pub struct BookingCoordinator {
    ledger: Arc<AppointmentLedger>,
    allocator: SlotAllocator,
    availability: Arc<dyn AvailabilityStore>,
    directory: Arc<dyn ParticipantDirectory>,
    notifier: Arc<dyn Notifier>,
    reminders: Arc<ReminderService>,
    clock: Arc<dyn Clock>,
}

impl BookingCoordinator {
    /// Wire a coordinator from its collaborators
    pub fn new(
        ledger: Arc<AppointmentLedger>,
        availability: Arc<dyn AvailabilityStore>,
        directory: Arc<dyn ParticipantDirectory>,
        notifier: Arc<dyn Notifier>,
        reminders: Arc<ReminderService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let allocator = SlotAllocator::new(Arc::clone(&availability), Arc::clone(&ledger));
        Self { ledger, allocator, availability, directory, notifier, reminders, clock }
    }

    /// Book an appointment
    ///
    /// With an exact slot, validates it still lies in open availability and
    /// lets the ledger re-check overlap at commit. With a search window,
    /// takes the earliest allocator candidate. Losing a race for the
    /// interval surfaces as `Conflict`; the engine never silently picks a
    /// different slot than the one requested.
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment> {
        request.validate()?;

        let professional = self.directory.get_professional(request.professional_id).await?;
        self.directory.get_client(request.client_id).await?;

        let slot = match request.slot {
            Some(slot) => {
                if !self.slot_is_open(request.professional_id, &slot).await? {
                    return Err(CarebookError::Conflict(format!(
                        "professional {} is not available over {} - {}",
                        request.professional_id, slot.start, slot.end
                    )));
                }
                slot
            }
            None => self.first_free_slot(&request).await?,
        };

        let initial_status = match professional.confirmation_policy {
            ConfirmationPolicy::AutoConfirm => AppointmentStatus::Confirmed,
            ConfirmationPolicy::RequireConfirmation => AppointmentStatus::Pending,
        };

        let appointment = self.ledger.create(
            NewAppointment {
                professional_id: request.professional_id,
                client_id: request.client_id,
                slot,
                medium: request.medium,
                location: request.location,
                initial_status,
                reminder_offsets: request.reminder_offsets,
            },
            self.clock.now(),
        )?;

        self.reminders.arm(&appointment);
        if appointment.status == AppointmentStatus::Confirmed {
            self.notify_parties(&appointment, NotificationKind::Confirmed).await;
        }

        info!(
            appointment_id = %appointment.id,
            professional_id = %appointment.professional_id,
            status = ?appointment.status,
            "Booking committed"
        );
        Ok(appointment)
    }

    /// Professional acknowledges a pending appointment
    ///
    /// Reminders were armed at booking time and the interval is unchanged,
    /// so the reminder set is deliberately left alone: re-arming would
    /// re-queue offsets that already fired while the appointment was
    /// pending.
    pub async fn confirm(&self, appointment_id: Uuid) -> Result<Appointment> {
        let appointment =
            self.ledger.transition(appointment_id, TransitionEvent::Confirm, self.clock.now())?;

        self.notify_parties(&appointment, NotificationKind::Confirmed).await;
        Ok(appointment)
    }

    /// Cancel an appointment; the slot becomes free again
    pub async fn cancel(&self, request: CancelRequest) -> Result<Appointment> {
        request.validate()?;

        let appointment = self.ledger.transition(
            request.appointment_id,
            TransitionEvent::Cancel { reason: request.reason },
            self.clock.now(),
        )?;

        self.reminders.disarm(appointment.id);
        self.notify_parties(&appointment, NotificationKind::Cancelled).await;
        Ok(appointment)
    }

    /// Move an appointment to a new interval, preserving its identity
    ///
    /// The professional's reschedule policy decides whether a confirmed
    /// appointment keeps its status or returns to `Pending`.
    pub async fn reschedule(&self, request: RescheduleRequest) -> Result<Appointment> {
        let current = self.ledger.get(request.appointment_id)?;
        let professional = self.directory.get_professional(current.professional_id).await?;

        if !self.slot_is_open(current.professional_id, &request.new_slot).await? {
            return Err(CarebookError::Conflict(format!(
                "professional {} is not available over {} - {}",
                current.professional_id, request.new_slot.start, request.new_slot.end
            )));
        }

        let revert_to_pending =
            professional.reschedule_policy == ReschedulePolicy::RequireReconfirmation;
        let appointment = self.ledger.reschedule(
            request.appointment_id,
            request.new_slot,
            revert_to_pending,
            self.clock.now(),
        )?;

        // Old events are invalidated; new ones target the new start
        self.reminders.arm(&appointment);
        self.notify_parties(&appointment, NotificationKind::Rescheduled).await;
        Ok(appointment)
    }

    /// Record a check-in signal from the external collaborator
    pub fn report_check_in(&self, appointment_id: Uuid) -> Result<Appointment> {
        self.ledger.record_check_in(appointment_id, self.clock.now())
    }

    /// Appointments involving a participant, sorted by start
    pub fn list_appointments(&self, query: &AppointmentQuery) -> Vec<Appointment> {
        self.ledger.list(query)
    }

    /// Free slots for a professional, sorted by start
    pub async fn list_available_slots(
        &self,
        professional_id: Uuid,
        range: &TimeRange,
        duration: std::time::Duration,
    ) -> Result<Vec<Slot>> {
        Ok(self.allocator.find_slots(professional_id, range, duration).await?.collect())
    }

    /// Resolve elapsed appointments to `Completed` or `NoShow`
    ///
    /// Each professional's grace duration comes from the directory; a
    /// professional the directory no longer knows falls back to the default
    /// grace rather than stalling the sweep.
    pub async fn lifecycle_sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        for professional_id in self.ledger.professionals() {
            let grace = match self.directory.get_professional(professional_id).await {
                Ok(professional) => professional.no_show_grace,
                Err(err) => {
                    warn!(
                        professional_id = %professional_id,
                        error = %err,
                        "Directory lookup failed during sweep; using default grace"
                    );
                    DEFAULT_NO_SHOW_GRACE
                }
            };

            for appointment in self.ledger.sweep(professional_id, now, grace) {
                self.reminders.disarm(appointment.id);
                match appointment.status {
                    AppointmentStatus::Completed => report.completed += 1,
                    AppointmentStatus::NoShow => report.no_shows += 1,
                    _ => {}
                }
            }
        }

        if report != SweepReport::default() {
            debug!(completed = report.completed, no_shows = report.no_shows, "Lifecycle sweep");
        }
        report
    }

    /// Archive terminal appointments older than the retention window
    pub fn archive_expired(&self, retention: std::time::Duration) -> usize {
        let cutoff = self.clock.now()
            - chrono::Duration::from_std(retention).unwrap_or_else(|_| chrono::Duration::zero());
        self.ledger.archive_before(cutoff)
    }

    /// Earliest allocator candidate for a window search
    async fn first_free_slot(&self, request: &BookingRequest) -> Result<TimeRange> {
        // validate() guarantees window and duration are present here
        let (window, duration) = match (&request.window, request.duration) {
            (Some(window), Some(duration)) => (window, duration),
            _ => {
                return Err(CarebookError::InvalidInput(
                    "window search requires a window and duration".to_string(),
                ))
            }
        };

        let mut slots = self.allocator.find_slots(request.professional_id, window, duration).await?;
        slots
            .next()
            .map(|slot| slot.range())
            .ok_or_else(|| {
                CarebookError::Conflict(format!(
                    "no free {duration:?} slot for professional {} in {} - {}",
                    request.professional_id, window.start, window.end
                ))
            })
    }

    /// Whether `slot` lies entirely within open availability
    ///
    /// Overlap against other appointments is NOT checked here; the ledger
    /// re-checks it inside the professional's boundary at commit time.
    async fn slot_is_open(&self, professional_id: Uuid, slot: &TimeRange) -> Result<bool> {
        let open = self.availability.open_windows(professional_id, slot).await?;
        Ok(open.iter().any(|window| window.contains(slot)))
    }

    /// Best-effort notification of both parties; never fails the operation
    async fn notify_parties(&self, appointment: &Appointment, kind: NotificationKind) {
        for participant_id in [appointment.client_id, appointment.professional_id] {
            if let Err(err) =
                self.notifier.notify(participant_id, appointment.id, kind).await
            {
                warn!(
                    appointment_id = %appointment.id,
                    participant_id = %participant_id,
                    ?kind,
                    error = %err,
                    "Notification delivery failed"
                );
            }
        }
    }
}
