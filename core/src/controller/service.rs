use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::bus::{SessionBus, SessionCommand, UI_STOP_ORIGIN};
use crate::context::AppContext;
use crate::error::{BusError, InitError};
use crate::session::{RunContext, RunPayload, SessionNode};
use crate::state::{SessionManager, SessionStatus};

use super::lifecycle::LifecycleController;
use super::reporter::SessionReporter;

/// Registers `node` and starts listening for its Run/Stop commands.
///
/// Each key gets its own task; commands for one key are handled one at a
/// time, in arrival order.
pub async fn initialize(
    ctx: &AppContext,
    node: Option<SessionNode>,
) -> Result<SessionHandle, InitError> {
    let node = node.ok_or(InitError::MissingSession)?;
    let session_key = node.session_key();

    let run_context = RunContext::from(&ctx.cfg().control);
    if !ctx.manager().register(&session_key, run_context).await {
        return Err(InitError::AlreadyRegistered(session_key));
    }
    let rx = ctx.bus().subscribe(&session_key).await?;

    let controller = LifecycleController::new(node, ctx);
    let reporter = controller.reporter().clone();
    let task = tokio::spawn(drive(controller, rx));

    tracing::info!(
        target: "sessionctl.session",
        stage = "session.init",
        session_key = %session_key,
        "session initialized"
    );

    Ok(SessionHandle {
        session_key,
        bus: ctx.bus().clone(),
        manager: ctx.manager().clone(),
        reporter,
        task,
    })
}

async fn drive(controller: LifecycleController, mut rx: mpsc::Receiver<SessionCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            SessionCommand::Run(payload) => match controller.on_run(&payload).await {
                Ok(outcome) => tracing::debug!(
                    target: "sessionctl.session",
                    session_key = controller.session_key(),
                    outcome = ?outcome,
                    "run handled"
                ),
                Err(e) => {
                    tracing::error!(
                        target: "sessionctl.session",
                        stage = "session.run.error",
                        session_key = controller.session_key(),
                        error = %e,
                        "run failed"
                    );
                    controller.fail(&e).await;
                }
            },
            SessionCommand::Stop { origin } => {
                if let Err(e) = controller.on_stop(&origin).await {
                    tracing::error!(
                        target: "sessionctl.session",
                        stage = "session.stop.error",
                        session_key = controller.session_key(),
                        error = %e,
                        "stop failed"
                    );
                }
            }
        }
    }
    tracing::debug!(
        target: "sessionctl.session",
        session_key = controller.session_key(),
        "command route closed"
    );
}

/// Caller-side handle to one initialized session.
pub struct SessionHandle {
    session_key: String,
    bus: SessionBus,
    manager: SessionManager,
    reporter: SessionReporter,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn key(&self) -> &str {
        &self.session_key
    }

    pub fn reporter(&self) -> &SessionReporter {
        &self.reporter
    }

    pub async fn run(&self, payload: RunPayload) -> Result<(), BusError> {
        self.bus
            .send(&self.session_key, SessionCommand::Run(Box::new(payload)))
            .await
    }

    pub async fn stop(&self, origin: Option<&str>) -> Result<(), BusError> {
        let origin = origin.unwrap_or(UI_STOP_ORIGIN).to_string();
        self.bus
            .send(&self.session_key, SessionCommand::Stop { origin })
            .await
    }

    pub async fn status(&self) -> Option<SessionStatus> {
        self.manager.status(&self.session_key).await
    }

    /// Closes the command route and waits for queued commands to finish.
    pub async fn close(self) {
        self.bus.unsubscribe(&self.session_key).await;
        if let Err(e) = self.task.await {
            tracing::warn!(
                target: "sessionctl.session",
                session_key = %self.session_key,
                error = %e,
                "session task ended abnormally"
            );
        }
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}
