//! # Session state
//!
//! Registry of session keys, per-session status and stop flag, and the
//! process-wide graceful-stop flag. Status changes are broadcast as
//! `StateEvent`s.

pub mod manager;
pub mod session;
pub mod transitions;
pub mod types;

pub use manager::{SessionManager, SessionStats};
pub use session::SessionState;
pub use transitions::{StateTransition, TransitionError};
pub use types::{SessionStatus, StateEvent};
