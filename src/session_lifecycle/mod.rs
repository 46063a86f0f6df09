// Session Lifecycle Module - Testable State Machine
//
// This module implements the complete session lifecycle: the statig-driven
// state machine for a single session, the shared types, and the async engine
// that orchestrates every session over its frozen roster.

pub mod engine;
pub mod state_machine;
pub mod types;


pub use engine::{SessionError, SessionLifecycleEngine};
pub use state_machine::{SessionStateMachine, TransitionError};
pub use types::{RosterSnapshot, Session, SessionEvent, SessionStatus, TransitionLogEntry};
