use thiserror::Error;

use crate::session::{NodeRef, SessionType};

/// Fatal parameter problems. The display strings are the messages raised on
/// the session's Error channel.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    #[error("Session Node with no Parameters.")]
    MissingParameters,
    #[error("sessionParameters.timeRange.config.initialDatetime is not a valid date.")]
    InvalidInitialDatetime,
    #[error("sessionParameters.timeRange.config.finalDatetime is not a valid date.")]
    InvalidFinalDatetime,
    #[error("Session Parameters Node with no Time Frame.")]
    MissingTimeFrame,
    #[error("Session Parameters Node with no Time Frame Label configuration.")]
    MissingTimeFrameLabel,
    #[error("Session Parameters Node with no Session Base Asset.")]
    MissingBaseAsset,
    #[error("Session Parameters Session Base Asset with no initialBalance configuration.")]
    MissingBaseInitialBalance,
    #[error("Session Parameters Node with no Session Quoted Asset.")]
    MissingQuotedAsset,
    #[error("Session Parameters Session Quoted Asset with no initialBalance configuration.")]
    MissingQuotedInitialBalance,
}

/// A fatal validation failure, carrying the node it should be reported against.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub node: Option<NodeRef>,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, node: Option<NodeRef>) -> Self {
        Self { kind, node }
    }

    pub fn node(&self) -> Option<&NodeRef> {
        self.node.as_ref()
    }
}

/// Session-type preconditions that failed during dispatch.
///
/// These never reach the Error channel; they are logged and turned into a
/// stopped session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{session_type}: key or secret not provided")]
    MissingCredentials { session_type: SessionType },
}
