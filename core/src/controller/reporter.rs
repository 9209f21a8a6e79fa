use chrono::{DateTime, Timelike, Utc};

use crate::bus::{ErrorEvent, HeartbeatEvent, Notification, SessionBus};
use crate::session::NodeRef;
use crate::state::SessionManager;

/// Outbound telemetry for one session key.
///
/// Both calls double as the only places the process-wide graceful-stop flag
/// is observed: if it is up, the session is marked for stopping.
#[derive(Clone)]
pub struct SessionReporter {
    session_key: String,
    manager: SessionManager,
    bus: SessionBus,
}

impl SessionReporter {
    pub fn new(session_key: String, manager: SessionManager, bus: SessionBus) -> Self {
        Self {
            session_key,
            manager,
            bus,
        }
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub async fn heartbeat(&self, processing_date: DateTime<Utc>) {
        self.bus.raise(
            &self.session_key,
            Notification::Heartbeat(HeartbeatEvent {
                seconds: Utc::now().second(),
                processing_date,
            }),
        );
        self.observe_graceful_stop().await;
    }

    pub async fn report_error(&self, node: Option<&NodeRef>, message: &str) {
        tracing::debug!(
            target: "sessionctl.session",
            stage = "session.error.out",
            session_key = %self.session_key,
            node_id = node.and_then(|n| n.id.as_deref()).unwrap_or(""),
            error_message = message,
            "error raised"
        );
        self.bus.raise(
            &self.session_key,
            Notification::Error(ErrorEvent::new(node, message)),
        );
        self.observe_graceful_stop().await;
    }

    /// Whether the driving loop should wind down.
    pub async fn stop_requested(&self) -> bool {
        self.manager.stop_requested(&self.session_key).await
    }

    /// Asks for this session to wind down, e.g. when a backtest runs out of data.
    pub async fn request_stop(&self) -> anyhow::Result<()> {
        self.manager.request_stop(&self.session_key).await
    }

    async fn observe_graceful_stop(&self) {
        if !self.manager.graceful_stop_requested() {
            return;
        }
        if let Err(e) = self.manager.request_stop(&self.session_key).await {
            tracing::warn!(
                target: "sessionctl.session",
                session_key = %self.session_key,
                error = %e,
                "graceful stop could not be recorded"
            );
        }
    }
}
