//! In-memory participant directory

use std::collections::HashMap;

use async_trait::async_trait;
use carebook_core::ParticipantDirectory;
use carebook_domain::{CarebookError, ClientProfile, ProfessionalProfile, Result};
use parking_lot::RwLock;
use uuid::Uuid;

/// Directory port backed by hash maps
#[derive(Default)]
pub struct InMemoryDirectory {
    professionals: RwLock<HashMap<Uuid, ProfessionalProfile>>,
    clients: RwLock<HashMap<Uuid, ClientProfile>>,
}

impl InMemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a professional record
    pub fn upsert_professional(&self, profile: ProfessionalProfile) {
        self.professionals.write().insert(profile.id, profile);
    }

    /// Register or replace a client record
    pub fn upsert_client(&self, profile: ClientProfile) {
        self.clients.write().insert(profile.id, profile);
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryDirectory {
    async fn get_professional(&self, id: Uuid) -> Result<ProfessionalProfile> {
        self.professionals
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CarebookError::NotFound(format!("professional {id}")))
    }

    async fn get_client(&self, id: Uuid) -> Result<ClientProfile> {
        self.clients
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| CarebookError::NotFound(format!("client {id}")))
    }
}
