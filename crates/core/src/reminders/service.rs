//! Reminder service - exactly-once reminder delivery
//!
//! Keeps a time-ordered queue of pending reminder events. Arming an
//! appointment replaces any events queued for it (generation-based lazy
//! invalidation: stale heap entries are dropped when they surface). Firing
//! pops every due event, delivers through the notifier port, and records the
//! outcome; an event whose appointment already started is discarded instead
//! of delivered late.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use carebook_domain::{Appointment, NotificationKind, ReminderEvent};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::scheduling::ports::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
struct QueuedReminder {
    fires_at: DateTime<Utc>,
    appointment_id: Uuid,
    client_id: Uuid,
    offset: std::time::Duration,
    generation: u64,
}

impl Ord for QueuedReminder {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.fires_at
            .cmp(&other.fires_at)
            .then_with(|| self.appointment_id.cmp(&other.appointment_id))
            .then_with(|| self.offset.cmp(&other.offset))
    }
}

impl PartialOrd for QueuedReminder {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    generation: u64,
    start: DateTime<Utc>,
}

enum Popped {
    Fire(QueuedReminder),
    Skip,
    Empty,
}

#[derive(Default)]
struct Inner {
    queue: BinaryHeap<Reverse<QueuedReminder>>,
    armed: HashMap<Uuid, Armed>,
    next_generation: u64,
    history: Vec<ReminderEvent>,
}

/// Maintains and fires pending reminders for active appointments
pub struct ReminderService {
    notifier: Arc<dyn Notifier>,
    inner: Mutex<Inner>,
}

impl ReminderService {
    /// Create a service delivering through the given notifier
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier, inner: Mutex::new(Inner::default()) }
    }

    /// Arm (or re-arm) reminders for an appointment
    ///
    /// Replaces any previously queued events for this appointment; callers
    /// re-arm after a reschedule and the new events target the new start.
    pub fn arm(&self, appointment: &Appointment) {
        let mut inner = self.inner.lock();
        inner.next_generation += 1;
        let generation = inner.next_generation;

        if !appointment.status.is_active() || appointment.reminder_offsets.is_empty() {
            inner.armed.remove(&appointment.id);
            return;
        }

        inner
            .armed
            .insert(appointment.id, Armed { generation, start: appointment.start });

        for &offset in &appointment.reminder_offsets {
            let Ok(span) = chrono::Duration::from_std(offset) else {
                warn!(appointment_id = %appointment.id, ?offset, "Skipping oversized reminder offset");
                continue;
            };
            inner.queue.push(Reverse(QueuedReminder {
                fires_at: appointment.start - span,
                appointment_id: appointment.id,
                client_id: appointment.client_id,
                offset,
                generation,
            }));
        }
        debug!(
            appointment_id = %appointment.id,
            offsets = appointment.reminder_offsets.len(),
            "Reminders armed"
        );
    }

    /// Invalidate all queued reminders for an appointment
    pub fn disarm(&self, appointment_id: Uuid) {
        let mut inner = self.inner.lock();
        inner.armed.remove(&appointment_id);
    }

    /// Deliver every due reminder, exactly once each
    ///
    /// Events whose `fires_at` was skipped over (downtime) still fire as
    /// long as the appointment has not started; otherwise they are
    /// discarded. Delivery failures are recorded and logged, never retried
    /// here (the notifier wrapper owns retries) and never re-queued.
    pub async fn fire_due(&self, now: DateTime<Utc>) -> Vec<ReminderEvent> {
        let mut fired = Vec::new();

        loop {
            let entry = match self.pop_due(now) {
                Popped::Empty => break,
                Popped::Skip => continue,
                Popped::Fire(entry) => entry,
            };

            let delivered = match self
                .notifier
                .notify(entry.client_id, entry.appointment_id, NotificationKind::Reminder)
                .await
            {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        appointment_id = %entry.appointment_id,
                        error = %err,
                        "Reminder delivery failed"
                    );
                    false
                }
            };

            let event = ReminderEvent {
                appointment_id: entry.appointment_id,
                client_id: entry.client_id,
                fires_at: entry.fires_at,
                offset: entry.offset,
                delivered,
            };
            self.inner.lock().history.push(event.clone());
            fired.push(event);
        }

        fired
    }

    /// Pop the next due queue entry, classifying stale and expired ones
    fn pop_due(&self, now: DateTime<Utc>) -> Popped {
        let mut inner = self.inner.lock();

        let due = inner.queue.peek().map_or(false, |head| head.0.fires_at <= now);
        if !due {
            return Popped::Empty;
        }
        let Some(Reverse(entry)) = inner.queue.pop() else {
            return Popped::Empty;
        };

        let Some(armed) = inner.armed.get(&entry.appointment_id).copied() else {
            return Popped::Skip;
        };
        if armed.generation != entry.generation {
            return Popped::Skip;
        }
        if armed.start <= now {
            // Appointment already started; too late to remind
            debug!(
                appointment_id = %entry.appointment_id,
                "Discarding reminder past appointment start"
            );
            return Popped::Skip;
        }

        Popped::Fire(entry)
    }

    /// Number of queued (possibly stale) events
    pub fn pending_count(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Events fired so far, in firing order
    pub fn history(&self) -> Vec<ReminderEvent> {
        self.inner.lock().history.clone()
    }
}
