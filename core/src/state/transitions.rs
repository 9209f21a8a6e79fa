//! Status transition rules

use super::types::SessionStatus;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
    #[error("Cannot transition from terminal state {state:?}")]
    FromTerminalState { state: SessionStatus },
}

pub struct StateTransition;

impl StateTransition {
    /// Validates a status change. A session that failed to start may be run
    /// again; a stopping session needs a process restart.
    pub fn validate(from: SessionStatus, to: SessionStatus) -> Result<(), TransitionError> {
        if Self::is_terminal(from) {
            return Err(TransitionError::FromTerminalState { state: from });
        }

        let is_valid = matches!(
            (from, to),
            (SessionStatus::Uninitialized, SessionStatus::Starting)
                | (SessionStatus::StoppedWithError, SessionStatus::Starting)
                | (SessionStatus::Starting, SessionStatus::Running)
                | (SessionStatus::Starting, SessionStatus::StoppedWithError)
                | (SessionStatus::Running, SessionStatus::StoppedWithError)
                | (SessionStatus::Running, SessionStatus::Stopping)
        );

        if is_valid {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to })
        }
    }

    pub fn is_terminal(status: SessionStatus) -> bool {
        matches!(status, SessionStatus::Stopping)
    }

    /// Whether a `Run` command may start a new cycle.
    pub fn accepts_run(status: SessionStatus) -> bool {
        Self::validate(status, SessionStatus::Starting).is_ok()
    }

    pub fn status_description(status: SessionStatus) -> &'static str {
        match status {
            SessionStatus::Uninitialized => "waiting for a run command",
            SessionStatus::Starting => "validating parameters",
            SessionStatus::Running => "running",
            SessionStatus::StoppedWithError => "stopped with error",
            SessionStatus::Stopping => "stopping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(
            StateTransition::validate(SessionStatus::Uninitialized, SessionStatus::Starting)
                .is_ok()
        );
        assert!(StateTransition::validate(SessionStatus::Starting, SessionStatus::Running).is_ok());
        assert!(StateTransition::validate(
            SessionStatus::Starting,
            SessionStatus::StoppedWithError
        )
        .is_ok());
        assert!(StateTransition::validate(SessionStatus::Running, SessionStatus::Stopping).is_ok());
        assert!(StateTransition::validate(
            SessionStatus::StoppedWithError,
            SessionStatus::Starting
        )
        .is_ok());
        assert!(StateTransition::validate(
            SessionStatus::Running,
            SessionStatus::StoppedWithError
        )
        .is_ok());
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(
            StateTransition::validate(SessionStatus::Uninitialized, SessionStatus::Running)
                .is_err()
        );
        assert!(
            StateTransition::validate(SessionStatus::Running, SessionStatus::Starting).is_err()
        );
        assert_eq!(
            StateTransition::validate(SessionStatus::Stopping, SessionStatus::Starting),
            Err(TransitionError::FromTerminalState {
                state: SessionStatus::Stopping
            })
        );
    }

    #[test]
    fn test_run_acceptance() {
        assert!(StateTransition::accepts_run(SessionStatus::Uninitialized));
        assert!(!StateTransition::accepts_run(SessionStatus::Running));
        assert!(StateTransition::accepts_run(SessionStatus::StoppedWithError));
        assert!(!StateTransition::accepts_run(SessionStatus::Starting));
        assert!(!StateTransition::accepts_run(SessionStatus::Stopping));
    }
}
