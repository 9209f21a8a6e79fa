#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use sessionctl_core::api::{
    AppConfig, AppContext, ExecutionEngine, Notifier, OutboundEvent, RunPayload, Services,
    SessionManager, SessionRun, SessionStatus, StateEvent,
};
use tokio::sync::broadcast;

/// Keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    finalized: AtomicUsize,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn finalized(&self) -> usize {
        self.finalized.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send_message(&self, text: &str) -> anyhow::Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn finalize(&self) -> anyhow::Result<()> {
        self.finalized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Accepts or declines every run, and remembers what it was given.
pub struct ScriptedEngine {
    accept: bool,
    beat_on_run: bool,
    runs: Mutex<Vec<SessionRun>>,
    finalized: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn new(accept: bool) -> Self {
        Self {
            accept,
            beat_on_run: false,
            runs: Mutex::new(Vec::new()),
            finalized: Mutex::new(Vec::new()),
        }
    }

    /// Sends one heartbeat from inside `run`, before answering.
    pub fn beating(accept: bool) -> Self {
        Self {
            beat_on_run: true,
            ..Self::new(accept)
        }
    }

    pub fn runs(&self) -> Vec<SessionRun> {
        self.runs.lock().unwrap().clone()
    }

    pub fn finalized(&self) -> Vec<String> {
        self.finalized.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn run(&self, run: SessionRun) -> bool {
        if self.beat_on_run {
            run.reporter.heartbeat(Utc::now()).await;
        }
        self.runs.lock().unwrap().push(run);
        self.accept
    }

    async fn finalize(&self, session_key: &str) {
        self.finalized.lock().unwrap().push(session_key.to_string());
    }
}

pub struct Harness {
    pub ctx: AppContext,
    pub notifier: Arc<RecordingNotifier>,
    pub engine: Arc<ScriptedEngine>,
}

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.events_out.enabled = false;
    cfg.control.live_wait_time_ms = 60_000;
    cfg.control.normal_wait_time_ms = 60_000;
    cfg
}

pub fn with_credentials(mut cfg: AppConfig) -> AppConfig {
    cfg.credentials.key = Some("api-key".to_string());
    cfg.credentials.secret = Some("api-secret".to_string());
    cfg
}

pub async fn harness(cfg: AppConfig, accept: bool) -> Harness {
    harness_with_engine(cfg, ScriptedEngine::new(accept)).await
}

pub async fn harness_with_engine(cfg: AppConfig, engine: ScriptedEngine) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = Arc::new(engine);
    let services = Services {
        notifier: notifier.clone(),
        engine: engine.clone(),
    };
    let ctx = AppContext::with_services(cfg, services).await.unwrap();
    Harness {
        ctx,
        notifier,
        engine,
    }
}

pub fn params() -> Value {
    json!({
        "id": "params-1",
        "name": "Session Parameters",
        "type": "Trading Parameters",
        "timeFrame": { "id": "tf-1", "type": "Time Frame", "config": { "label": "01-hs" } },
        "sessionBaseAsset": { "id": "ba-1", "type": "Session Base Asset", "config": { "initialBalance": 1 } },
        "sessionQuotedAsset": {
            "id": "qa-1",
            "type": "Session Quoted Asset",
            "config": { "initialBalance": 1000, "minimumBalance": 100 }
        }
    })
}

pub fn session_json(session_type: &str, config: Value, parameters: Option<Value>) -> Value {
    let mut node = json!({
        "id": "s-1",
        "name": "Test",
        "type": session_type,
        "config": config,
    });
    if let Some(p) = parameters {
        node["parameters"] = p;
    }
    node
}

pub fn payload(session: &Value) -> RunPayload {
    RunPayload {
        app_schema: json!([{ "type": session["type"] }]).to_string(),
        trading_system: json!({ "name": "TS" }).to_string(),
        trading_engine: json!({ "name": "TE" }).to_string(),
        session: session.to_string(),
        dependency_filter: String::new(),
        resume: false,
    }
}

pub async fn next_notification(rx: &mut broadcast::Receiver<OutboundEvent>) -> OutboundEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("notification timed out")
        .expect("notification channel closed")
}

/// Waits until `session_key` reaches `status`.
pub async fn wait_for_status(manager: &SessionManager, session_key: &str, status: SessionStatus) {
    let mut events = manager.subscribe();
    if manager.status(session_key).await == Some(status) {
        return;
    }
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await {
                Ok(StateEvent::StatusChanged {
                    session_key: key,
                    new_status,
                    ..
                }) if key == session_key && new_status == status => return,
                Ok(_) => {}
                Err(e) => panic!("state events ended: {e}"),
            }
        }
    })
    .await
    .expect("status timed out");
}
