use thiserror::Error;

use crate::state::TransitionError;

/// Unexpected failures on the Run/Stop path. Validation and dispatch
/// failures are not errors at this level; they are reported and folded
/// into the run outcome.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("run payload field `{field}` is not valid JSON: {source}")]
    Payload {
        field: &'static str,
        source: serde_json::Error,
    },
    #[error("session `{0}` is not registered")]
    NotRegistered(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("state error: {0}")]
    State(#[from] anyhow::Error),
}

/// Why a session could not be brought up at all.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("cannot run without a session")]
    MissingSession,
    #[error("session `{0}` is already registered")]
    AlreadyRegistered(String),
    #[error("bus error: {0}")]
    Bus(#[from] BusError),
    #[error("events out: {0}")]
    EventsOut(String),
    #[error("services: {0}")]
    Services(#[from] anyhow::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BusError {
    #[error("no subscriber for session `{0}`")]
    NoRoute(String),
    #[error("session `{0}` already has a subscriber")]
    AlreadySubscribed(String),
    #[error("command channel for session `{0}` is closed")]
    Closed(String),
    #[error("unknown inbound event `{0}`")]
    UnknownEvent(String),
    #[error("invalid payload for `{event}`: {message}")]
    InvalidPayload { event: String, message: String },
}
