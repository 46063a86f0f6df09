// NeuroTEA Library - Group Session Lifecycle and Membership Tracking
// This exposes the core components for testing and integration

pub mod config;
pub mod core;
pub mod ids;
pub mod membership;
pub mod registry;
pub mod session_lifecycle;
pub mod telemetry;
pub mod tracker;

// Re-export key types for easy access
pub use config::{config, init_config, NeuroteaConfig, SessionPolicyConfig};
pub use core::{CoreError, NeuroteaCore};
pub use ids::{ActivityId, GroupId, ParticipantId, SessionId};
pub use membership::{Group, GroupMembershipManager, MembershipError};
pub use registry::{EnrollmentStatus, Participant, ParticipantRegistry, RegistryError};
pub use session_lifecycle::{
    RosterSnapshot, Session, SessionError, SessionEvent, SessionLifecycleEngine, SessionStatus,
    TransitionError, TransitionLogEntry,
};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use tracker::{AttendanceRecord, AttendanceStatus, TrackerError, MAX_SCORE};
