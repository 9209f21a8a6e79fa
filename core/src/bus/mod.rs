//! Typed command/notification transport between the UI side and sessions.

mod adapter;
mod types;

pub use adapter::SessionBus;
pub use types::{
    ErrorEvent, HeartbeatEvent, Notification, OutboundEvent, SessionCommand, RUN_SESSION_EVENT,
    STOP_SESSION_EVENT, UI_STOP_ORIGIN,
};
