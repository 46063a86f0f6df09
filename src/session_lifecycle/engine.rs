// Session Lifecycle Engine - orchestrates sessions over frozen rosters
//
// The engine consults the membership manager exactly once per session, at
// scheduling time, and owns every transition afterwards. Each session lives
// in its own slot behind its own lock so distinct sessions never contend;
// the sessions index lock is held only long enough to find a slot.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::SessionPolicyConfig;
use crate::ids::{ActivityId, GroupId, ParticipantId, SessionId};
use crate::membership::{GroupMembershipManager, MembershipError};
use crate::registry::{ParticipantRegistry, RegistryError};
use crate::session_lifecycle::state_machine::{SessionStateMachine, TransitionError};
use crate::session_lifecycle::types::{
    RosterSnapshot, Session, SessionEvent, SessionStatus, TransitionLogEntry,
};
use crate::telemetry::{create_session_span, generate_correlation_id};
use crate::tracker::{AttendanceRecord, AttendanceSheet, AttendanceStatus, TrackerError};
use statig::prelude::*;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown session: {0}")]
    SessionNotFound(SessionId),
    #[error("invalid session window: end {end} is not after start {start}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("group {0} has no members to schedule a session for")]
    EmptyGroup(GroupId),
    #[error(transparent)]
    Membership(#[from] MembershipError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// One session's machine and attendance sheet, guarded by a single lock so
/// state checks stay atomic with the writes that depend on them
struct SessionSlot {
    machine: StateMachine<SessionStateMachine>,
    sheet: AttendanceSheet,
    /// Minted at scheduling time; links every transition span for the
    /// session back to the schedule event
    correlation_id: String,
}

/// Orchestrator for all session lifecycles
pub struct SessionLifecycleEngine {
    registry: Arc<Mutex<ParticipantRegistry>>,
    membership: Arc<Mutex<GroupMembershipManager>>,
    sessions: Arc<Mutex<HashMap<SessionId, Arc<Mutex<SessionSlot>>>>>,
    policy: SessionPolicyConfig,
}

impl SessionLifecycleEngine {
    pub fn new(
        registry: Arc<Mutex<ParticipantRegistry>>,
        membership: Arc<Mutex<GroupMembershipManager>>,
    ) -> Self {
        Self::with_policy(registry, membership, SessionPolicyConfig::default())
    }

    pub fn with_policy(
        registry: Arc<Mutex<ParticipantRegistry>>,
        membership: Arc<Mutex<GroupMembershipManager>>,
        policy: SessionPolicyConfig,
    ) -> Self {
        Self {
            registry,
            membership,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            policy,
        }
    }

    /// Schedule a session for a group, freezing its roster at this instant.
    ///
    /// The snapshot is ordered by registration sequence and is final: later
    /// add/remove calls on the group never touch it.
    pub async fn schedule(
        &self,
        group_id: GroupId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SessionId, SessionError> {
        if end <= start {
            return Err(SessionError::InvalidWindow { start, end });
        }

        let members = {
            let membership = self.membership.lock().await;
            membership.snapshot_roster(group_id)?
        };
        if members.is_empty() {
            return Err(SessionError::EmptyGroup(group_id));
        }

        // Freeze in registration order so reports read the same way the
        // registry does
        let roster = {
            let registry = self.registry.lock().await;
            let mut ordered: Vec<(u64, ParticipantId)> = Vec::with_capacity(members.len());
            for participant in members {
                ordered.push((registry.registration_index(participant)?, participant));
            }
            ordered.sort_by_key(|(seq, _)| *seq);
            RosterSnapshot::new(ordered.into_iter().map(|(_, p)| p).collect())
        };

        let session_id = SessionId::new();
        let correlation_id = generate_correlation_id();
        let slot = SessionSlot {
            machine: SessionStateMachine::new(session_id, group_id, start, end, roster.clone())
                .state_machine(),
            sheet: AttendanceSheet::new(session_id, roster.clone()),
            correlation_id: correlation_id.clone(),
        };
        self.sessions
            .lock()
            .await
            .insert(session_id, Arc::new(Mutex::new(slot)));

        tracing::info!(
            session_id = %session_id,
            group_id = %group_id,
            roster_size = roster.len(),
            correlation.id = %correlation_id,
            "Session scheduled with frozen roster"
        );
        Ok(session_id)
    }

    async fn slot(&self, session_id: SessionId) -> Result<Arc<Mutex<SessionSlot>>, SessionError> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&session_id)
            .cloned()
            .ok_or(SessionError::SessionNotFound(session_id))
    }

    /// Apply one lifecycle event; validation happens before the machine sees
    /// it, so a rejected event changes nothing.
    async fn apply(&self, session_id: SessionId, event: SessionEvent) -> Result<(), SessionError> {
        let slot = self.slot(session_id).await?;
        let mut slot = slot.lock().await;

        let target = slot.machine.inner().validate(event)?;
        let session_label = session_id.to_string();
        let group_label = slot.machine.inner().group_id.to_string();
        let span = create_session_span(
            "session_transition",
            Some(&session_label),
            Some(&group_label),
            Some(slot.correlation_id.as_str()),
        );
        let _enter = span.enter();
        slot.machine.handle(&event);

        if target == SessionStatus::Completed && self.policy.auto_finalize_on_complete {
            slot.sheet.finalize();
        }
        Ok(())
    }

    pub async fn start(&self, session_id: SessionId) -> Result<(), SessionError> {
        self.apply(session_id, SessionEvent::Start).await
    }

    pub async fn pause(&self, session_id: SessionId) -> Result<(), SessionError> {
        self.apply(session_id, SessionEvent::Pause).await
    }

    pub async fn resume(&self, session_id: SessionId) -> Result<(), SessionError> {
        self.apply(session_id, SessionEvent::Resume).await
    }

    /// Complete a running session and (by default) finalize its records
    pub async fn complete(&self, session_id: SessionId) -> Result<(), SessionError> {
        self.apply(session_id, SessionEvent::Complete).await
    }

    pub async fn cancel(&self, session_id: SessionId) -> Result<(), SessionError> {
        self.apply(session_id, SessionEvent::Cancel).await
    }

    /// Explicitly finalize a completed session's records. Only needed when
    /// `auto_finalize_on_complete` is disabled; idempotent either way.
    pub async fn finalize(&self, session_id: SessionId) -> Result<(), SessionError> {
        let slot = self.slot(session_id).await?;
        let mut slot = slot.lock().await;
        if slot.machine.inner().status() != SessionStatus::Completed {
            return Err(TrackerError::SessionNotOpen(session_id).into());
        }
        slot.sheet.finalize();
        Ok(())
    }

    pub async fn mark_attendance(
        &self,
        session_id: SessionId,
        participant: ParticipantId,
        status: AttendanceStatus,
    ) -> Result<(), SessionError> {
        let slot = self.slot(session_id).await?;
        let mut slot = slot.lock().await;
        Self::check_open(session_id, &slot)?;
        slot.sheet.mark_attendance(participant, status)?;
        Ok(())
    }

    pub async fn record_score(
        &self,
        session_id: SessionId,
        participant: ParticipantId,
        activity: ActivityId,
        score: u8,
    ) -> Result<(), SessionError> {
        let slot = self.slot(session_id).await?;
        let mut slot = slot.lock().await;
        Self::check_open(session_id, &slot)?;
        slot.sheet.record_score(participant, activity, score)?;
        Ok(())
    }

    /// Attendance records in registration order; readable in every state
    pub async fn report(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<AttendanceRecord>, SessionError> {
        let slot = self.slot(session_id).await?;
        let slot = slot.lock().await;
        Ok(slot.sheet.report())
    }

    /// Read-only view of a session
    pub async fn session(&self, session_id: SessionId) -> Result<Session, SessionError> {
        let slot = self.slot(session_id).await?;
        let slot = slot.lock().await;
        Ok(slot.machine.inner().view())
    }

    pub async fn status(&self, session_id: SessionId) -> Result<SessionStatus, SessionError> {
        self.session(session_id).await.map(|s| s.status)
    }

    pub async fn transition_log(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<TransitionLogEntry>, SessionError> {
        self.session(session_id).await.map(|s| s.transition_log)
    }

    /// Writes require an open session; a finalized sheet reports the more
    /// specific closed error
    fn check_open(session_id: SessionId, slot: &SessionSlot) -> Result<(), TrackerError> {
        if slot.sheet.is_finalized() {
            return Err(TrackerError::SessionClosed(session_id));
        }
        if !slot.machine.inner().status().is_open() {
            return Err(TrackerError::SessionNotOpen(session_id));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SessionLifecycleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLifecycleEngine")
            .field("sessions", &"Arc<Mutex<HashMap<SessionId, ..>>>")
            .finish()
    }
}
