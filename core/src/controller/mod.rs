//! Per-session lifecycle: command handling, state transitions, reporting.

mod lifecycle;
mod reporter;
mod service;

pub use lifecycle::{LifecycleController, RunOutcome};
pub use reporter::SessionReporter;
pub use service::{initialize, SessionHandle};
