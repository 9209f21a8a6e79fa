//! State type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Registered, never run
    Uninitialized,
    /// Run accepted, validating and dispatching
    Starting,
    /// Idle/Running: an engine owns the session
    Running,
    /// Validation, dispatch or the engine refused the run
    StoppedWithError,
    /// Stop requested by command or graceful-stop flag
    Stopping,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::StoppedWithError => "stopped_with_error",
            Self::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

/// State events
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StateEvent {
    /// Session key registered
    SessionRegistered {
        session_key: String,
        timestamp: DateTime<Utc>,
    },
    /// Status changed
    StatusChanged {
        session_key: String,
        old_status: SessionStatus,
        new_status: SessionStatus,
        timestamp: DateTime<Utc>,
    },
    /// stopRequested flipped on
    StopRequested {
        session_key: String,
        timestamp: DateTime<Utc>,
    },
    /// Unexpected failure on the run path
    SessionFailed {
        session_key: String,
        error: String,
        timestamp: DateTime<Utc>,
    },
    /// Process-wide graceful stop raised
    GracefulStopRequested { timestamp: DateTime<Utc> },
}

impl StateEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SessionRegistered { timestamp, .. } => *timestamp,
            Self::StatusChanged { timestamp, .. } => *timestamp,
            Self::StopRequested { timestamp, .. } => *timestamp,
            Self::SessionFailed { timestamp, .. } => *timestamp,
            Self::GracefulStopRequested { timestamp } => *timestamp,
        }
    }

    pub fn session_key(&self) -> Option<&str> {
        match self {
            Self::SessionRegistered { session_key, .. }
            | Self::StatusChanged { session_key, .. }
            | Self::StopRequested { session_key, .. }
            | Self::SessionFailed { session_key, .. } => Some(session_key),
            Self::GracefulStopRequested { .. } => None,
        }
    }
}
