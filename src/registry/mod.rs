// Participant Registry - identity and enrollment state
//
// The registry is the only owner of Participant records. The other managers
// query it (registration order drives report ordering) but never mutate it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::ids::ParticipantId;

/// Enrollment status of a participant in the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    Active,
    Inactive,
}

/// A registered participant. Identity is immutable; status is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub status: EnrollmentStatus,
    /// Monotone sequence assigned at registration; defines report ordering
    pub registration_seq: u64,
}

impl Participant {
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown participant: {0}")]
    NotFound(ParticipantId),
}

/// In-memory participant store
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    participants: HashMap<ParticipantId, Participant>,
    next_seq: u64,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new participant and hand back their id
    pub fn register(&mut self, name: impl Into<String>) -> ParticipantId {
        let id = ParticipantId::new();
        let seq = self.next_seq;
        self.next_seq += 1;
        let participant = Participant {
            id,
            name: name.into(),
            status: EnrollmentStatus::Active,
            registration_seq: seq,
        };
        tracing::info!(
            participant_id = %id,
            name = %participant.name,
            registration_seq = seq,
            "Participant registered"
        );
        self.participants.insert(id, participant);
        id
    }

    /// Mark a participant inactive. Idempotent for already-inactive ids.
    pub fn deactivate(&mut self, id: ParticipantId) -> Result<(), RegistryError> {
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        if participant.status == EnrollmentStatus::Inactive {
            return Ok(());
        }
        participant.status = EnrollmentStatus::Inactive;
        tracing::info!(participant_id = %id, "Participant deactivated");
        Ok(())
    }

    /// Reactivate a previously deactivated participant. Idempotent.
    pub fn reactivate(&mut self, id: ParticipantId) -> Result<(), RegistryError> {
        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        if participant.status == EnrollmentStatus::Active {
            return Ok(());
        }
        participant.status = EnrollmentStatus::Active;
        tracing::info!(participant_id = %id, "Participant reactivated");
        Ok(())
    }

    pub fn lookup(&self, id: ParticipantId) -> Result<&Participant, RegistryError> {
        self.participants.get(&id).ok_or(RegistryError::NotFound(id))
    }

    /// Registration sequence for an id, used to order roster snapshots
    pub fn registration_index(&self, id: ParticipantId) -> Result<u64, RegistryError> {
        self.lookup(id).map(|p| p.registration_seq)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.participants.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// All participants in registration order
    pub fn iter_in_registration_order(&self) -> impl Iterator<Item = &Participant> {
        let mut all: Vec<&Participant> = self.participants.values().collect();
        all.sort_by_key(|p| p.registration_seq);
        all.into_iter()
    }
}
