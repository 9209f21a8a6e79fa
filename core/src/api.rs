//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `sessionctl_core::api` instead of reaching into internal modules.

pub use crate::bus::{
    ErrorEvent, HeartbeatEvent, Notification, OutboundEvent, SessionBus, SessionCommand,
    RUN_SESSION_EVENT, STOP_SESSION_EVENT, UI_STOP_ORIGIN,
};
pub use crate::config::{
    load_default, load_from_path, AppConfig, ControlConfig, CredentialsConfig, EventsOutConfig,
    LoggingConfig, NotifierConfig, WebhookNotifierConfig,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::controller::{initialize, LifecycleController, RunOutcome, SessionHandle, SessionReporter};
pub use crate::error::{
    BusError, DispatchError, InitError, SessionError, ValidationError, ValidationErrorKind,
};
pub use crate::events_out::{spawn_mirror, start_events_out, EventsOutTx};
pub use crate::runner::{ExecutionEngine, Notifier, SessionRun};
pub use crate::session::{
    dispatch, validate_parameters, AppSchemaMap, Credentials, NodeRef, NormalizedSession, Parameters,
    RunContext, RunDefinition, RunPayload, SessionNode, SessionType,
};
pub use crate::state::{SessionManager, SessionStats, SessionStatus, StateEvent};
