//! In-memory mock implementations of the engine's ports

#![allow(dead_code)] // test binaries each use a subset of these helpers

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use carebook_core::{AvailabilityStore, Notifier, ParticipantDirectory};
use carebook_domain::{
    CarebookError, ClientProfile, NotificationKind, ProfessionalProfile,
    Result as DomainResult, TimeRange,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Mock availability: explicit open intervals per professional
#[derive(Default)]
pub struct MockAvailability {
    open: Mutex<HashMap<Uuid, Vec<TimeRange>>>,
}

impl MockAvailability {
    /// Replace a professional's open intervals
    pub fn set_open(&self, professional_id: Uuid, spans: Vec<(DateTime<Utc>, DateTime<Utc>)>) {
        let spans = spans
            .into_iter()
            .map(|(start, end)| TimeRange { start, end })
            .collect();
        self.open.lock().unwrap().insert(professional_id, spans);
    }
}

#[async_trait]
impl AvailabilityStore for MockAvailability {
    async fn open_windows(
        &self,
        professional_id: Uuid,
        range: &TimeRange,
    ) -> DomainResult<Vec<TimeRange>> {
        let open = self.open.lock().unwrap();
        let spans = open
            .get(&professional_id)
            .ok_or_else(|| CarebookError::NotFound(format!("professional {professional_id}")))?;

        let mut clipped: Vec<TimeRange> =
            spans.iter().filter_map(|span| span.intersect(range)).collect();
        clipped.sort_by_key(|span| span.start);
        Ok(clipped)
    }
}

/// Mock participant directory backed by hash maps
#[derive(Default)]
pub struct MockDirectory {
    professionals: Mutex<HashMap<Uuid, ProfessionalProfile>>,
    clients: Mutex<HashMap<Uuid, ClientProfile>>,
}

impl MockDirectory {
    /// Register a professional with default policies
    pub fn add_default_professional(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.upsert_professional(ProfessionalProfile::new(id));
        id
    }

    /// Register or replace a professional record
    pub fn upsert_professional(&self, profile: ProfessionalProfile) {
        self.professionals.lock().unwrap().insert(profile.id, profile);
    }

    /// Register a client
    pub fn add_client(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.clients.lock().unwrap().insert(id, ClientProfile { id });
        id
    }
}

#[async_trait]
impl ParticipantDirectory for MockDirectory {
    async fn get_professional(&self, id: Uuid) -> DomainResult<ProfessionalProfile> {
        self.professionals
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| CarebookError::NotFound(format!("professional {id}")))
    }

    async fn get_client(&self, id: Uuid) -> DomainResult<ClientProfile> {
        self.clients
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| CarebookError::NotFound(format!("client {id}")))
    }
}

/// Notifier that records every delivery attempt
#[derive(Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<(Uuid, Uuid, NotificationKind)>>,
}

impl RecordingNotifier {
    /// All recorded calls, in delivery order
    pub fn calls(&self) -> Vec<(Uuid, Uuid, NotificationKind)> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls of one kind
    pub fn calls_of(&self, kind: NotificationKind) -> Vec<(Uuid, Uuid)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, k)| *k == kind)
            .map(|(participant, appointment, _)| (*participant, *appointment))
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        participant_id: Uuid,
        appointment_id: Uuid,
        kind: NotificationKind,
    ) -> DomainResult<()> {
        self.calls.lock().unwrap().push((participant_id, appointment_id, kind));
        Ok(())
    }
}
