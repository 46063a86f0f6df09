use chrono::{DateTime, Utc};
use statig::prelude::*;
use thiserror::Error;

use crate::ids::{GroupId, SessionId};
use crate::session_lifecycle::types::{
    RosterSnapshot, Session, SessionEvent, SessionStatus, TransitionLogEntry,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition: {event:?} is not permitted from {from:?}")]
    InvalidTransition {
        from: SessionStatus,
        event: SessionEvent,
    },
}

/// Shared storage for one session's lifecycle.
///
/// The statig machine drives the state handlers; the mirror fields below are
/// what queries read, so callers never have to pattern-match the generated
/// state type.
pub struct SessionStateMachine {
    pub session_id: SessionId,
    pub group_id: GroupId,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    roster: RosterSnapshot,
    status: SessionStatus,
    transition_log: Vec<TransitionLogEntry>,
}

impl SessionStateMachine {
    pub fn new(
        session_id: SessionId,
        group_id: GroupId,
        scheduled_start: DateTime<Utc>,
        scheduled_end: DateTime<Utc>,
        roster: RosterSnapshot,
    ) -> Self {
        Self {
            session_id,
            group_id,
            scheduled_start,
            scheduled_end,
            roster,
            status: SessionStatus::Scheduled,
            transition_log: Vec::new(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn roster(&self) -> &RosterSnapshot {
        &self.roster
    }

    pub fn transition_log(&self) -> &[TransitionLogEntry] {
        &self.transition_log
    }

    /// Check an event against the current state without applying it
    pub fn validate(&self, event: SessionEvent) -> Result<SessionStatus, TransitionError> {
        self.status
            .permits(event)
            .ok_or(TransitionError::InvalidTransition {
                from: self.status,
                event,
            })
    }

    /// Serializable view of the session for reporting and persistence
    pub fn view(&self) -> Session {
        Session {
            id: self.session_id,
            group_id: self.group_id,
            scheduled_start: self.scheduled_start,
            scheduled_end: self.scheduled_end,
            status: self.status,
            roster: self.roster.clone(),
            transition_log: self.transition_log.clone(),
        }
    }

    fn record_transition(&mut self, to: SessionStatus) {
        let entry = TransitionLogEntry {
            from: self.status,
            to,
            at: Utc::now(),
        };
        tracing::info!(
            session_id = %self.session_id,
            group_id = %self.group_id,
            from = ?entry.from,
            to = ?entry.to,
            "Session transition"
        );
        self.status = to;
        self.transition_log.push(entry);
    }
}

#[state_machine(initial = "State::scheduled()")]
impl SessionStateMachine {
    #[state]
    fn scheduled(&mut self, event: &SessionEvent) -> Outcome<State> {
        match event {
            SessionEvent::Start => {
                self.record_transition(SessionStatus::Active);
                Transition(State::active())
            }
            SessionEvent::Cancel => {
                self.record_transition(SessionStatus::Cancelled);
                Transition(State::cancelled())
            }
            _ => Handled,
        }
    }

    #[state]
    fn active(&mut self, event: &SessionEvent) -> Outcome<State> {
        match event {
            SessionEvent::Pause => {
                self.record_transition(SessionStatus::Paused);
                Transition(State::paused())
            }
            SessionEvent::Complete => {
                self.record_transition(SessionStatus::Completed);
                Transition(State::completed())
            }
            _ => Handled,
        }
    }

    #[state]
    fn paused(&mut self, event: &SessionEvent) -> Outcome<State> {
        match event {
            SessionEvent::Resume => {
                self.record_transition(SessionStatus::Active);
                Transition(State::active())
            }
            SessionEvent::Complete => {
                self.record_transition(SessionStatus::Completed);
                Transition(State::completed())
            }
            _ => Handled,
        }
    }

    #[state]
    fn completed(&mut self, event: &SessionEvent) -> Outcome<State> {
        // Terminal: every event is swallowed; callers validate first
        match event {
            _ => Handled,
        }
    }

    #[state]
    fn cancelled(&mut self, event: &SessionEvent) -> Outcome<State> {
        // Terminal
        match event {
            _ => Handled,
        }
    }
}
