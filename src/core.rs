// Composition Root - one owner for all process-wide state
//
// NeuroteaCore wires the registry, the membership manager and the lifecycle
// engine together behind their locks and exposes the whole API surface. The
// managers are injected at construction; there are no ad-hoc singletons.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::NeuroteaConfig;
use crate::ids::{ActivityId, GroupId, ParticipantId, SessionId};
use crate::membership::{Group, GroupMembershipManager, MembershipError};
use crate::registry::{Participant, ParticipantRegistry, RegistryError};
use crate::session_lifecycle::{Session, SessionError, SessionLifecycleEngine, SessionStatus, TransitionLogEntry};
use crate::tracker::{AttendanceRecord, AttendanceStatus};

/// Errors surfaced by the composition root; every variant is recoverable and
/// a failed call leaves no partial state behind
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Membership(#[from] MembershipError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Process-wide entry point owning all stores
pub struct NeuroteaCore {
    registry: Arc<Mutex<ParticipantRegistry>>,
    membership: Arc<Mutex<GroupMembershipManager>>,
    engine: SessionLifecycleEngine,
}

impl NeuroteaCore {
    pub fn new() -> Self {
        Self::with_config(&NeuroteaConfig::default())
    }

    pub fn with_config(config: &NeuroteaConfig) -> Self {
        let registry = Arc::new(Mutex::new(ParticipantRegistry::new()));
        let membership = Arc::new(Mutex::new(GroupMembershipManager::with_max_capacity(
            config.groups.max_capacity,
        )));
        let engine = SessionLifecycleEngine::with_policy(
            registry.clone(),
            membership.clone(),
            config.sessions.clone(),
        );
        Self {
            registry,
            membership,
            engine,
        }
    }

    // --- Participant Registry ---

    pub async fn register_participant(&self, name: impl Into<String>) -> ParticipantId {
        self.registry.lock().await.register(name)
    }

    pub async fn deactivate_participant(&self, id: ParticipantId) -> Result<(), CoreError> {
        self.registry.lock().await.deactivate(id)?;
        Ok(())
    }

    pub async fn reactivate_participant(&self, id: ParticipantId) -> Result<(), CoreError> {
        self.registry.lock().await.reactivate(id)?;
        Ok(())
    }

    pub async fn lookup_participant(&self, id: ParticipantId) -> Result<Participant, CoreError> {
        Ok(self.registry.lock().await.lookup(id)?.clone())
    }

    // --- Group Membership Manager ---

    pub async fn create_group(&self, capacity: usize) -> Result<GroupId, CoreError> {
        Ok(self.membership.lock().await.create_group(capacity)?)
    }

    pub async fn group(&self, id: GroupId) -> Result<Group, CoreError> {
        Ok(self.membership.lock().await.group(id)?.clone())
    }

    pub async fn add_member(
        &self,
        group: GroupId,
        participant: ParticipantId,
    ) -> Result<(), CoreError> {
        self.membership.lock().await.add_member(group, participant)?;
        Ok(())
    }

    pub async fn remove_member(
        &self,
        group: GroupId,
        participant: ParticipantId,
    ) -> Result<(), CoreError> {
        self.membership
            .lock()
            .await
            .remove_member(group, participant)?;
        Ok(())
    }

    pub async fn group_of(&self, participant: ParticipantId) -> Option<GroupId> {
        self.membership.lock().await.group_of(participant)
    }

    pub async fn snapshot_roster(&self, group: GroupId) -> Result<Vec<ParticipantId>, CoreError> {
        Ok(self.membership.lock().await.snapshot_roster(group)?)
    }

    // --- Session Lifecycle Engine ---

    pub async fn schedule_session(
        &self,
        group: GroupId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SessionId, CoreError> {
        Ok(self.engine.schedule(group, start, end).await?)
    }

    pub async fn start_session(&self, session: SessionId) -> Result<(), CoreError> {
        Ok(self.engine.start(session).await?)
    }

    pub async fn pause_session(&self, session: SessionId) -> Result<(), CoreError> {
        Ok(self.engine.pause(session).await?)
    }

    pub async fn resume_session(&self, session: SessionId) -> Result<(), CoreError> {
        Ok(self.engine.resume(session).await?)
    }

    pub async fn complete_session(&self, session: SessionId) -> Result<(), CoreError> {
        Ok(self.engine.complete(session).await?)
    }

    pub async fn cancel_session(&self, session: SessionId) -> Result<(), CoreError> {
        Ok(self.engine.cancel(session).await?)
    }

    pub async fn finalize_session(&self, session: SessionId) -> Result<(), CoreError> {
        Ok(self.engine.finalize(session).await?)
    }

    pub async fn session(&self, session: SessionId) -> Result<Session, CoreError> {
        Ok(self.engine.session(session).await?)
    }

    pub async fn session_status(&self, session: SessionId) -> Result<SessionStatus, CoreError> {
        Ok(self.engine.status(session).await?)
    }

    pub async fn transition_log(
        &self,
        session: SessionId,
    ) -> Result<Vec<TransitionLogEntry>, CoreError> {
        Ok(self.engine.transition_log(session).await?)
    }

    // --- Progress/Attendance Tracker ---

    pub async fn mark_attendance(
        &self,
        session: SessionId,
        participant: ParticipantId,
        status: AttendanceStatus,
    ) -> Result<(), CoreError> {
        Ok(self.engine.mark_attendance(session, participant, status).await?)
    }

    pub async fn record_score(
        &self,
        session: SessionId,
        participant: ParticipantId,
        activity: ActivityId,
        score: u8,
    ) -> Result<(), CoreError> {
        Ok(self
            .engine
            .record_score(session, participant, activity, score)
            .await?)
    }

    pub async fn report(&self, session: SessionId) -> Result<Vec<AttendanceRecord>, CoreError> {
        Ok(self.engine.report(session).await?)
    }
}

impl Default for NeuroteaCore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NeuroteaCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuroteaCore").finish_non_exhaustive()
    }
}
