//! Per-session state held by the manager

use super::transitions::{StateTransition, TransitionError};
use super::types::SessionStatus;
use crate::session::{NormalizedSession, RunContext};
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SessionState {
    pub session_key: String,
    pub status: SessionStatus,
    pub stop_requested: bool,
    /// Poll intervals for this session only.
    pub run_context: RunContext,
    /// Set when a run cycle starts.
    pub run_id: Option<String>,
    pub folder_name: Option<String>,
    /// Normalized session of the accepted run, if any.
    pub session: Option<Arc<NormalizedSession>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(session_key: String, run_context: RunContext) -> Self {
        let now = Utc::now();
        Self {
            session_key,
            status: SessionStatus::Uninitialized,
            stop_requested: false,
            run_context,
            run_id: None,
            folder_name: None,
            session: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition_to(&mut self, new_status: SessionStatus) -> Result<(), TransitionError> {
        StateTransition::validate(self.status, new_status)?;
        self.status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Returns true if the flag was newly set.
    pub fn mark_stop_requested(&mut self) -> bool {
        let changed = !self.stop_requested;
        self.stop_requested = true;
        self.updated_at = Utc::now();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RunContext {
        RunContext {
            live_wait_time_ms: 1,
            normal_wait_time_ms: 2,
        }
    }

    #[test]
    fn test_session_creation() {
        let s = SessionState::new("k".into(), ctx());
        assert_eq!(s.status, SessionStatus::Uninitialized);
        assert!(!s.stop_requested);
        assert!(s.run_id.is_none());
    }

    #[test]
    fn test_session_transition() {
        let mut s = SessionState::new("k".into(), ctx());
        s.transition_to(SessionStatus::Starting).unwrap();
        s.transition_to(SessionStatus::Running).unwrap();
        assert_eq!(s.status, SessionStatus::Running);
        assert!(s.transition_to(SessionStatus::Starting).is_err());
        assert_eq!(s.status, SessionStatus::Running);
    }

    #[test]
    fn test_stop_flag_reports_change_once() {
        let mut s = SessionState::new("k".into(), ctx());
        assert!(s.mark_stop_requested());
        assert!(!s.mark_stop_requested());
    }
}
