// Core types for the session lifecycle state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, ParticipantId, SessionId};

/// Session states in the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Created with a frozen roster, not yet started
    Scheduled,
    /// Session is running; attendance and scores accepted
    Active,
    /// Temporarily interrupted; attendance and scores still accepted
    Paused,
    /// Finished; records finalized, terminal
    Completed,
    /// Called off before it ever started, terminal
    Cancelled,
}

impl SessionStatus {
    /// Open sessions accept attendance and score writes
    pub fn is_open(self) -> bool {
        matches!(self, SessionStatus::Active | SessionStatus::Paused)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }

    /// Target state if `event` is legal from this state, None otherwise
    pub fn permits(self, event: SessionEvent) -> Option<SessionStatus> {
        match (self, event) {
            (SessionStatus::Scheduled, SessionEvent::Start) => Some(SessionStatus::Active),
            (SessionStatus::Scheduled, SessionEvent::Cancel) => Some(SessionStatus::Cancelled),
            (SessionStatus::Active, SessionEvent::Pause) => Some(SessionStatus::Paused),
            (SessionStatus::Active, SessionEvent::Complete) => Some(SessionStatus::Completed),
            (SessionStatus::Paused, SessionEvent::Resume) => Some(SessionStatus::Active),
            (SessionStatus::Paused, SessionEvent::Complete) => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}

/// Caller-driven lifecycle events. The engine never self-triggers on the
/// wall clock; a scheduler invoking these at the right moment is an
/// external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Start,
    Pause,
    Resume,
    Complete,
    Cancel,
}

/// One applied transition, appended to the session's audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionLogEntry {
    pub from: SessionStatus,
    pub to: SessionStatus,
    pub at: DateTime<Utc>,
}

/// Membership frozen at scheduling time, ordered by registration sequence.
///
/// Later edits to the originating group never touch this copy, which keeps
/// historical attendance records stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot(Vec<ParticipantId>);

impl RosterSnapshot {
    pub fn new(members: Vec<ParticipantId>) -> Self {
        Self(members)
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.0.contains(&participant)
    }

    pub fn members(&self) -> &[ParticipantId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.0.iter().copied()
    }
}

/// Read-only view of a session, the shape a persistence layer must preserve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub group_id: GroupId,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: SessionStatus,
    pub roster: RosterSnapshot,
    pub transition_log: Vec<TransitionLogEntry>,
}
