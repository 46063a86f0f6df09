// Progress/Attendance Tracker - per-session record keeping
//
// One sheet per session, created when the session is scheduled and frozen
// when it completes. Records exist only for participants in the session's
// frozen roster; the engine owns the openness (Active/Paused) check because
// only it knows the session state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::ids::{ActivityId, ParticipantId, SessionId};
use crate::session_lifecycle::RosterSnapshot;

/// Attendance status for one participant at one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

/// Highest score a scored activity can earn
pub const MAX_SCORE: u8 = 100;

/// Finished record for one (session, participant) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub session_id: SessionId,
    pub participant_id: ParticipantId,
    pub status: AttendanceStatus,
    /// Scored activity entries, keyed by activity
    pub scores: BTreeMap<ActivityId, u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("participant {participant} is not in the frozen roster of session {session}")]
    NotInRoster {
        session: SessionId,
        participant: ParticipantId,
    },
    #[error("session {0} is not open for attendance writes")]
    SessionNotOpen(SessionId),
    #[error("session {0} is finalized; records are read-only")]
    SessionClosed(SessionId),
    #[error("score {score} is out of range (0-{MAX_SCORE})")]
    ScoreOutOfRange { score: u8 },
}

/// Per-participant working entry; status stays unset until first marked
#[derive(Debug, Default, Clone)]
struct SheetEntry {
    status: Option<AttendanceStatus>,
    scores: BTreeMap<ActivityId, u8>,
}

/// Working attendance sheet for one session
#[derive(Debug)]
pub struct AttendanceSheet {
    session_id: SessionId,
    roster: RosterSnapshot,
    entries: HashMap<ParticipantId, SheetEntry>,
    finalized: bool,
}

impl AttendanceSheet {
    pub fn new(session_id: SessionId, roster: RosterSnapshot) -> Self {
        Self {
            session_id,
            roster,
            entries: HashMap::new(),
            finalized: false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn writable_entry(
        &mut self,
        participant: ParticipantId,
    ) -> Result<&mut SheetEntry, TrackerError> {
        if self.finalized {
            return Err(TrackerError::SessionClosed(self.session_id));
        }
        if !self.roster.contains(participant) {
            return Err(TrackerError::NotInRoster {
                session: self.session_id,
                participant,
            });
        }
        Ok(self.entries.entry(participant).or_default())
    }

    /// Mark (or re-mark) attendance; the last written status wins
    pub fn mark_attendance(
        &mut self,
        participant: ParticipantId,
        status: AttendanceStatus,
    ) -> Result<(), TrackerError> {
        let session_id = self.session_id;
        let entry = self.writable_entry(participant)?;
        entry.status = Some(status);
        tracing::debug!(
            session_id = %session_id,
            participant_id = %participant,
            status = ?status,
            "Attendance marked"
        );
        Ok(())
    }

    /// Record a scored activity; re-recording the same activity overwrites
    pub fn record_score(
        &mut self,
        participant: ParticipantId,
        activity: ActivityId,
        score: u8,
    ) -> Result<(), TrackerError> {
        if score > MAX_SCORE {
            return Err(TrackerError::ScoreOutOfRange { score });
        }
        let session_id = self.session_id;
        let entry = self.writable_entry(participant)?;
        entry.scores.insert(activity.clone(), score);
        tracing::debug!(
            session_id = %session_id,
            participant_id = %participant,
            activity = %activity,
            score,
            "Activity score recorded"
        );
        Ok(())
    }

    /// Freeze the sheet. Idempotent, so a replayed completion never fails.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        tracing::info!(
            session_id = %self.session_id,
            records = self.entries.len(),
            "Attendance sheet finalized"
        );
    }

    /// Records in roster (registration) order, readable in every state.
    /// Participants with scores but no explicit mark report as Absent.
    pub fn report(&self) -> Vec<AttendanceRecord> {
        self.roster
            .iter()
            .filter_map(|participant| {
                self.entries.get(&participant).map(|entry| AttendanceRecord {
                    session_id: self.session_id,
                    participant_id: participant,
                    status: entry.status.unwrap_or(AttendanceStatus::Absent),
                    scores: entry.scores.clone(),
                })
            })
            .collect()
    }
}
