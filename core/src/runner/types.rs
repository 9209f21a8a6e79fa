use serde_json::Value;
use std::sync::Arc;

use crate::controller::SessionReporter;
use crate::session::{AppSchemaMap, NormalizedSession, RunContext};

/// Everything an engine receives for one accepted run.
#[derive(Clone)]
pub struct SessionRun {
    pub run_id: String,
    pub session: Arc<NormalizedSession>,
    pub app_schema: Arc<AppSchemaMap>,
    pub trading_system: Arc<Value>,
    pub trading_engine: Arc<Value>,
    pub dependency_filter: Arc<Value>,
    pub resume: bool,
    pub first_execution: bool,
    pub run_context: RunContext,
    /// Heartbeat/error channel back to the UI; also answers "should I stop?".
    pub reporter: SessionReporter,
}

impl SessionRun {
    /// Poll interval for this session's type.
    pub fn wait_time_ms(&self) -> u64 {
        self.run_context.wait_time_ms(self.session.session_type)
    }
}
