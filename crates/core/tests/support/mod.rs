//! Shared test helpers for `carebook-core` integration tests.
//!
//! Lightweight port mocks and a wired-up engine fixture so the flow tests
//! can focus on behaviour instead of boilerplate.

#![allow(dead_code)] // test binaries each use a subset of these helpers

pub mod ports;

use std::sync::Arc;

use carebook_common::time::{Clock, MockClock};
use carebook_core::{AppointmentLedger, BookingCoordinator, ReminderService};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

pub use ports::{MockAvailability, MockDirectory, RecordingNotifier};

/// Monday, June 2nd 2025 - the reference day for flow tests
pub fn day(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).single().unwrap()
}

pub fn hours(h: u64) -> std::time::Duration {
    std::time::Duration::from_secs(h * 3600)
}

pub fn minutes(m: u64) -> std::time::Duration {
    std::time::Duration::from_secs(m * 60)
}

/// A fully wired engine over mock ports
pub struct TestEngine {
    pub coordinator: BookingCoordinator,
    pub ledger: Arc<AppointmentLedger>,
    pub reminders: Arc<ReminderService>,
    pub availability: Arc<MockAvailability>,
    pub directory: Arc<MockDirectory>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: MockClock,
}

impl TestEngine {
    /// Engine with an empty directory and no availability, clock at 08:00
    pub fn new() -> Self {
        let clock = MockClock::at(day(8, 0));
        let ledger = Arc::new(AppointmentLedger::new());
        let availability = Arc::new(MockAvailability::default());
        let directory = Arc::new(MockDirectory::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let reminders = Arc::new(ReminderService::new(
            Arc::clone(&notifier) as Arc<dyn carebook_core::Notifier>,
        ));

        let coordinator = BookingCoordinator::new(
            Arc::clone(&ledger),
            Arc::clone(&availability) as Arc<dyn carebook_core::AvailabilityStore>,
            Arc::clone(&directory) as Arc<dyn carebook_core::ParticipantDirectory>,
            Arc::clone(&notifier) as Arc<dyn carebook_core::Notifier>,
            Arc::clone(&reminders),
            Arc::new(clock.clone()) as Arc<dyn Clock>,
        );

        Self { coordinator, ledger, reminders, availability, directory, notifier, clock }
    }

    /// Register a professional with default policies and a 09:00-17:00
    /// open day, returning the professional's id
    pub fn seed_professional(&self) -> Uuid {
        let id = self.directory.add_default_professional();
        self.availability.set_open(id, vec![(day(9, 0), day(17, 0))]);
        id
    }

    /// Register a client, returning the client's id
    pub fn seed_client(&self) -> Uuid {
        self.directory.add_client()
    }
}
