//! Appointment ledger - the system of record
//!
//! Owns every appointment and enforces the no-overlap invariant: for a given
//! professional, no two appointments with an active status (`Pending` or
//! `Confirmed`) ever hold overlapping intervals.
//!
//! Concurrency contract: each professional has one serialization boundary, a
//! mutex around that professional's book. Mutating operations validate and
//! commit inside the boundary without suspending, so a slot that looked free
//! to two callers is only ever committed to one of them. Queries clone
//! matching entries out under the lock (copy-on-read) and never block a
//! concurrent booking for longer than that copy.

use std::sync::Arc;

use carebook_domain::{
    Appointment, AppointmentQuery, AppointmentStatus, CarebookError, Medium, Result, TimeRange,
    TransitionEvent,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Everything the ledger needs to admit a new appointment
///
/// The initial status is decided upstream from the professional's
/// confirmation policy.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub professional_id: Uuid,
    pub client_id: Uuid,
    pub slot: TimeRange,
    pub medium: Medium,
    pub location: Option<String>,
    pub initial_status: AppointmentStatus,
    pub reminder_offsets: Vec<std::time::Duration>,
}

type Book = Arc<Mutex<Vec<Appointment>>>;

/// Authoritative store of appointment entities and their states
pub struct AppointmentLedger {
    /// Per-professional appointment books, kept sorted by start
    books: DashMap<Uuid, Book>,
    /// Appointment id -> owning professional
    index: DashMap<Uuid, Uuid>,
}

impl AppointmentLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self { books: DashMap::new(), index: DashMap::new() }
    }

    fn book_for(&self, professional_id: Uuid) -> Book {
        let entry =
            self.books.entry(professional_id).or_insert_with(|| Arc::new(Mutex::new(Vec::new())));
        Arc::clone(entry.value())
    }

    /// Admit a new appointment, re-checking the no-overlap invariant at the
    /// instant of commit
    pub fn create(&self, new: NewAppointment, now: DateTime<Utc>) -> Result<Appointment> {
        if !new.initial_status.is_active() {
            return Err(CarebookError::InvalidInput(format!(
                "appointments enter the ledger as Pending or Confirmed, not {:?}",
                new.initial_status
            )));
        }

        let book = self.book_for(new.professional_id);
        let mut book = book.lock();

        if let Some(conflicting) = first_conflict(&book, &new.slot, None) {
            return Err(CarebookError::Conflict(format!(
                "professional {} already has appointment {} over {} - {}",
                new.professional_id, conflicting, new.slot.start, new.slot.end
            )));
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            professional_id: new.professional_id,
            client_id: new.client_id,
            start: new.slot.start,
            end: new.slot.end,
            medium: new.medium,
            location: new.location,
            status: new.initial_status,
            created_at: now,
            last_modified_at: now,
            reminder_offsets: new.reminder_offsets,
            cancel_reason: None,
            checked_in_at: None,
        };

        let pos = book.partition_point(|a| a.start <= appointment.start);
        book.insert(pos, appointment.clone());
        self.index.insert(appointment.id, appointment.professional_id);

        info!(
            appointment_id = %appointment.id,
            professional_id = %appointment.professional_id,
            status = ?appointment.status,
            "Appointment created"
        );
        Ok(appointment)
    }

    /// Fetch a snapshot of one appointment
    pub fn get(&self, appointment_id: Uuid) -> Result<Appointment> {
        let professional_id = self.professional_of(appointment_id)?;
        let book = self.book_for(professional_id);
        let book = book.lock();
        book.iter()
            .find(|a| a.id == appointment_id)
            .cloned()
            .ok_or_else(|| CarebookError::NotFound(format!("appointment {appointment_id}")))
    }

    /// Apply a state-machine event to an appointment
    ///
    /// Confirmation re-validates that the interval is still free against the
    /// current book, inside the professional's boundary.
    pub fn transition(
        &self,
        appointment_id: Uuid,
        event: TransitionEvent,
        now: DateTime<Utc>,
    ) -> Result<Appointment> {
        let professional_id = self.professional_of(appointment_id)?;
        let book = self.book_for(professional_id);
        let mut book = book.lock();

        if event == TransitionEvent::Confirm {
            let slot = slot_of(&book, appointment_id)?;
            if let Some(conflicting) = first_conflict(&book, &slot, Some(appointment_id)) {
                return Err(CarebookError::Conflict(format!(
                    "appointment {appointment_id} lost its slot to {conflicting}"
                )));
            }
        }

        let appointment = find_mut(&mut book, appointment_id)?;
        appointment.apply(event, now)?;
        let snapshot = appointment.clone();

        debug!(appointment_id = %appointment_id, status = ?snapshot.status, "Appointment transitioned");
        Ok(snapshot)
    }

    /// Move an active appointment to a new interval
    ///
    /// Identity (id, professional, client) is preserved. When
    /// `revert_to_pending` is set a confirmed appointment returns to
    /// `Pending` for re-acknowledgement.
    pub fn reschedule(
        &self,
        appointment_id: Uuid,
        new_slot: TimeRange,
        revert_to_pending: bool,
        now: DateTime<Utc>,
    ) -> Result<Appointment> {
        let professional_id = self.professional_of(appointment_id)?;
        let book = self.book_for(professional_id);
        let mut book = book.lock();

        {
            let appointment = find_ref(&book, appointment_id)?;
            if !appointment.status.is_active() {
                return Err(CarebookError::InvalidTransition(format!(
                    "appointment {appointment_id} is {:?}; cannot reschedule",
                    appointment.status
                )));
            }
        }

        if let Some(conflicting) = first_conflict(&book, &new_slot, Some(appointment_id)) {
            return Err(CarebookError::Conflict(format!(
                "professional {professional_id} already has appointment {conflicting} over {} - {}",
                new_slot.start, new_slot.end
            )));
        }

        let appointment = find_mut(&mut book, appointment_id)?;
        appointment.start = new_slot.start;
        appointment.end = new_slot.end;
        if revert_to_pending && appointment.status == AppointmentStatus::Confirmed {
            appointment.status = AppointmentStatus::Pending;
        }
        appointment.checked_in_at = None;
        appointment.last_modified_at = now;
        let snapshot = appointment.clone();

        book.sort_by_key(|a| a.start);

        info!(
            appointment_id = %appointment_id,
            start = %snapshot.start,
            status = ?snapshot.status,
            "Appointment rescheduled"
        );
        Ok(snapshot)
    }

    /// Record a check-in signal for a confirmed appointment
    pub fn record_check_in(&self, appointment_id: Uuid, now: DateTime<Utc>) -> Result<Appointment> {
        let professional_id = self.professional_of(appointment_id)?;
        let book = self.book_for(professional_id);
        let mut book = book.lock();

        let appointment = find_mut(&mut book, appointment_id)?;
        if appointment.status != AppointmentStatus::Confirmed {
            return Err(CarebookError::InvalidTransition(format!(
                "appointment {appointment_id} is {:?}; check-in applies to confirmed appointments",
                appointment.status
            )));
        }
        appointment.checked_in_at.get_or_insert(now);
        Ok(appointment.clone())
    }

    /// Snapshot of appointments matching the query, sorted by start
    pub fn list(&self, query: &AppointmentQuery) -> Vec<Appointment> {
        let mut matches: Vec<Appointment> = Vec::new();
        for entry in self.books.iter() {
            let book = entry.value().lock();
            matches.extend(
                book.iter()
                    .filter(|a| {
                        a.professional_id == query.participant_id
                            || a.client_id == query.participant_id
                    })
                    .filter(|a| query.status.map_or(true, |s| a.status == s))
                    .filter(|a| query.range.as_ref().map_or(true, |r| a.overlaps(r)))
                    .cloned(),
            );
        }
        matches.sort_by_key(|a| a.start);
        matches
    }

    /// Intervals of active appointments overlapping `range`, sorted by start
    ///
    /// This is the busy list the slot allocator subtracts from availability.
    pub fn active_intervals(&self, professional_id: Uuid, range: &TimeRange) -> Vec<TimeRange> {
        let Some(book) = self.books.get(&professional_id).map(|b| Arc::clone(b.value())) else {
            return Vec::new();
        };
        let book = book.lock();
        book.iter()
            .filter(|a| a.status.is_active() && a.overlaps(range))
            .map(|a| a.span())
            .collect()
    }

    /// Professionals with at least one appointment on the books
    pub fn professionals(&self) -> Vec<Uuid> {
        self.books.iter().map(|entry| *entry.key()).collect()
    }

    /// Resolve elapsed confirmed appointments for one professional
    ///
    /// Once `now` passes an appointment's end it completes if a check-in was
    /// seen; once `now` also passes the grace window with no check-in it
    /// becomes a no-show. Returns the appointments that changed.
    pub fn sweep(
        &self,
        professional_id: Uuid,
        now: DateTime<Utc>,
        grace: std::time::Duration,
    ) -> Vec<Appointment> {
        let Some(book) = self.books.get(&professional_id).map(|b| Arc::clone(b.value())) else {
            return Vec::new();
        };
        let mut book = book.lock();
        let grace = chrono::Duration::from_std(grace).unwrap_or_else(|_| chrono::Duration::zero());

        let mut changed = Vec::new();
        for appointment in book.iter_mut() {
            if appointment.status != AppointmentStatus::Confirmed || now < appointment.end {
                continue;
            }
            let event = if appointment.checked_in_at.is_some() {
                TransitionEvent::Complete
            } else if now >= appointment.end + grace {
                TransitionEvent::MarkNoShow
            } else {
                // Still inside the grace window; a late check-in may arrive
                continue;
            };
            if appointment.apply(event, now).is_ok() {
                changed.push(appointment.clone());
            }
        }
        changed
    }

    /// Remove terminal appointments that ended before `cutoff`
    ///
    /// Active appointments are never archived; cancellation is a status, not
    /// a removal, until the retention window has passed.
    pub fn archive_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut archived = 0;
        for entry in self.books.iter() {
            let mut book = entry.value().lock();
            book.retain(|a| {
                let expired = a.status.is_terminal() && a.end < cutoff;
                if expired {
                    self.index.remove(&a.id);
                    archived += 1;
                }
                !expired
            });
        }
        if archived > 0 {
            info!(archived, "Archived expired appointments");
        }
        archived
    }

    fn professional_of(&self, appointment_id: Uuid) -> Result<Uuid> {
        self.index
            .get(&appointment_id)
            .map(|entry| *entry.value())
            .ok_or_else(|| CarebookError::NotFound(format!("appointment {appointment_id}")))
    }
}

impl Default for AppointmentLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// First active appointment overlapping `slot`, excluding `exclude`
fn first_conflict(book: &[Appointment], slot: &TimeRange, exclude: Option<Uuid>) -> Option<Uuid> {
    book.iter()
        .filter(|a| Some(a.id) != exclude)
        .find(|a| a.status.is_active() && a.overlaps(slot))
        .map(|a| a.id)
}

fn slot_of(book: &[Appointment], appointment_id: Uuid) -> Result<TimeRange> {
    find_ref(book, appointment_id).map(Appointment::span)
}

fn find_ref(book: &[Appointment], appointment_id: Uuid) -> Result<&Appointment> {
    book.iter()
        .find(|a| a.id == appointment_id)
        .ok_or_else(|| CarebookError::NotFound(format!("appointment {appointment_id}")))
}

fn find_mut(book: &mut [Appointment], appointment_id: Uuid) -> Result<&mut Appointment> {
    book.iter_mut()
        .find(|a| a.id == appointment_id)
        .ok_or_else(|| CarebookError::NotFound(format!("appointment {appointment_id}")))
}
