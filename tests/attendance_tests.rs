//! Attendance and progress tracking integration tests
//!
//! Verifies the frozen-roster precondition, overwrite-idempotent marking,
//! score validation, and registration-ordered reporting.

use chrono::{Duration, Utc};
use neurotea::{
    AttendanceStatus, CoreError, NeuroteaCore, SessionError, TrackerError,
};

async fn scheduled_trio() -> (
    NeuroteaCore,
    neurotea::SessionId,
    Vec<neurotea::ParticipantId>,
) {
    let core = NeuroteaCore::new();
    let group = core.create_group(4).await.unwrap();
    let mut participants = Vec::new();
    for name in ["Lucía", "Mateo", "Valeria"] {
        let p = core.register_participant(name).await;
        core.add_member(group, p).await.unwrap();
        participants.push(p);
    }
    let start = Utc::now();
    let session = core
        .schedule_session(group, start, start + Duration::minutes(45))
        .await
        .unwrap();
    (core, session, participants)
}

#[tokio::test]
async fn test_remark_attendance_keeps_last_status() {
    let (core, session, participants) = scheduled_trio().await;
    core.start_session(session).await.unwrap();

    core.mark_attendance(session, participants[0], AttendanceStatus::Late)
        .await
        .unwrap();
    core.mark_attendance(session, participants[0], AttendanceStatus::Present)
        .await
        .unwrap();

    let report = core.report(session).await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].participant_id, participants[0]);
    assert_eq!(report[0].status, AttendanceStatus::Present);
}

#[tokio::test]
async fn test_report_follows_registration_order() {
    let (core, session, participants) = scheduled_trio().await;
    core.start_session(session).await.unwrap();

    // Mark in reverse registration order
    for p in participants.iter().rev() {
        core.mark_attendance(session, *p, AttendanceStatus::Present)
            .await
            .unwrap();
    }

    let order: Vec<_> = core
        .report(session)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.participant_id)
        .collect();
    assert_eq!(order, participants);
}

#[tokio::test]
async fn test_score_bounds() {
    let (core, session, participants) = scheduled_trio().await;
    core.start_session(session).await.unwrap();

    core.record_score(session, participants[0], "matching-cards".into(), 0)
        .await
        .unwrap();
    core.record_score(session, participants[0], "greeting-circle".into(), 100)
        .await
        .unwrap();

    let err = core
        .record_score(session, participants[0], "puzzle".into(), 101)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Session(SessionError::Tracker(TrackerError::ScoreOutOfRange {
            score: 101
        }))
    ));

    let report = core.report(session).await.unwrap();
    assert_eq!(report[0].scores.len(), 2);
    // The rejected activity never made it into the record
    assert!(!report[0]
        .scores
        .keys()
        .any(|a| a.as_str() == "puzzle"));
}

#[tokio::test]
async fn test_rescore_overwrites_activity() {
    let (core, session, participants) = scheduled_trio().await;
    core.start_session(session).await.unwrap();

    core.record_score(session, participants[1], "puzzle".into(), 40)
        .await
        .unwrap();
    core.record_score(session, participants[1], "puzzle".into(), 85)
        .await
        .unwrap();

    let report = core.report(session).await.unwrap();
    assert_eq!(report[0].scores[&neurotea::ActivityId::from("puzzle")], 85);
}

#[tokio::test]
async fn test_non_roster_writes_rejected() {
    let (core, session, _) = scheduled_trio().await;
    core.start_session(session).await.unwrap();

    let outsider = core.register_participant("Outsider").await;
    let err = core
        .mark_attendance(session, outsider, AttendanceStatus::Present)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Session(SessionError::Tracker(TrackerError::NotInRoster { .. }))
    ));
}

#[tokio::test]
async fn test_writes_rejected_before_start() {
    let (core, session, participants) = scheduled_trio().await;

    let err = core
        .mark_attendance(session, participants[0], AttendanceStatus::Present)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Session(SessionError::Tracker(TrackerError::SessionNotOpen(_)))
    ));
}

#[tokio::test]
async fn test_report_readable_after_finalization() {
    let (core, session, participants) = scheduled_trio().await;
    core.start_session(session).await.unwrap();

    core.mark_attendance(session, participants[0], AttendanceStatus::Present)
        .await
        .unwrap();
    core.mark_attendance(session, participants[2], AttendanceStatus::Absent)
        .await
        .unwrap();
    core.record_score(session, participants[0], "calm-corner".into(), 95)
        .await
        .unwrap();
    core.complete_session(session).await.unwrap();

    let report = core.report(session).await.unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].participant_id, participants[0]);
    assert_eq!(report[0].scores.len(), 1);
    assert_eq!(report[1].participant_id, participants[2]);
    assert_eq!(report[1].status, AttendanceStatus::Absent);

    // Records are serializable for the persistence contract
    let json = serde_json::to_string(&report).unwrap();
    let back: Vec<neurotea::AttendanceRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
