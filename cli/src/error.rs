use thiserror::Error;

use sessionctl_core::api::{DispatchError, InitError, SessionError, ValidationError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("init failed: {0}")]
    Init(#[from] InitError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("invalid parameters: {0}")]
    Validation(#[from] ValidationError),
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    // 0: success
    // 1: session ended with an error
    // 11: config error
    // 20: init / IO error
    // 30: parameter validation failed
    // 31: session-type precondition failed
    // 32: malformed run payload
    // 50: internal/uncategorized
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 11,
            Self::Init(InitError::EventsOut(_)) => 11,
            Self::Init(_) => 20,
            Self::Io(_) => 20,
            Self::Command(_) => 20,
            Self::Validation(_) => 30,
            Self::Dispatch(_) => 31,
            Self::Session(_) => 32,
            Self::Anyhow(_) => 50,
        }
    }
}
