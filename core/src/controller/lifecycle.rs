//! Run/Stop handling for one session key.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::context::{AppContext, Services};
use crate::error::{DispatchError, SessionError};
use crate::runner::SessionRun;
use crate::session::{
    dispatch, validate_parameters, Credentials, NodeRef, NormalizedSession, RunDefinition,
    RunPayload, SessionNode, SessionType,
};
use crate::state::{SessionManager, SessionStatus, StateTransition};

use super::reporter::SessionReporter;

/// How a `Run` command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The session was already running; nothing changed.
    AlreadyRunning,
    /// The session is mid-start or stopping and cannot start again.
    Rejected(SessionStatus),
    /// Validation failed and was reported on the Error channel.
    InvalidParameters,
    /// A session-type precondition failed; logged only.
    DispatchFailed,
    /// The execution engine refused the session.
    EngineDeclined,
    Started,
}

pub struct LifecycleController {
    session_key: String,
    process_session: SessionNode,
    manager: SessionManager,
    services: Services,
    credentials: Option<Credentials>,
    reporter: SessionReporter,
}

impl LifecycleController {
    pub fn new(process_session: SessionNode, ctx: &AppContext) -> Self {
        let session_key = process_session.session_key();
        let reporter =
            SessionReporter::new(session_key.clone(), ctx.manager().clone(), ctx.bus().clone());
        Self {
            session_key,
            process_session,
            manager: ctx.manager().clone(),
            services: ctx.services().clone(),
            credentials: ctx.credentials(),
            reporter,
        }
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn reporter(&self) -> &SessionReporter {
        &self.reporter
    }

    pub async fn on_run(&self, payload: &RunPayload) -> Result<RunOutcome, SessionError> {
        self.on_run_at(payload, Utc::now()).await
    }

    /// Handles `Run Session` with an explicit clock.
    pub async fn on_run_at(
        &self,
        payload: &RunPayload,
        now: DateTime<Utc>,
    ) -> Result<RunOutcome, SessionError> {
        let key = self.session_key.as_str();
        let status = self
            .manager
            .status(key)
            .await
            .ok_or_else(|| SessionError::NotRegistered(key.to_string()))?;

        // A reloaded UI re-sends Run for a session that is still going.
        if status == SessionStatus::Running {
            tracing::debug!(
                target: "sessionctl.session",
                stage = "session.run.ignored",
                session_key = key,
                "session already running"
            );
            return Ok(RunOutcome::AlreadyRunning);
        }
        if !StateTransition::accepts_run(status) {
            tracing::warn!(
                target: "sessionctl.session",
                stage = "session.run.rejected",
                session_key = key,
                status = %status,
                "run rejected, {}",
                StateTransition::status_description(status)
            );
            return Ok(RunOutcome::Rejected(status));
        }
        self.manager.transition(key, SessionStatus::Starting).await?;

        let definition = RunDefinition::from_payload(payload)?;
        let node = &definition.session;
        if node.session_key() != key {
            tracing::warn!(
                target: "sessionctl.session",
                session_key = key,
                payload_key = %node.session_key(),
                "run payload describes a different session"
            );
        }

        let run_id = Uuid::new_v4().to_string();
        let folder_name = node.folder_name();
        self.manager
            .update_session(key, |s| {
                s.run_id = Some(run_id.clone());
                s.folder_name = Some(folder_name.clone());
            })
            .await?;
        tracing::info!(
            target: "sessionctl.session",
            stage = "session.run.in",
            session_key = key,
            run_id = %run_id,
            folder_name = %folder_name,
            session_type = %node.session_type,
            resume = definition.resume,
            schema_types = definition.app_schema.len(),
            "run accepted"
        );

        let parameters = match validate_parameters(node, now) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(
                    target: "sessionctl.session",
                    stage = "session.validate",
                    session_key = key,
                    error = %e,
                    "parameter validation failed"
                );
                self.reporter.report_error(e.node(), &e.to_string()).await;
                self.manager
                    .transition(key, SessionStatus::StoppedWithError)
                    .await?;
                return Ok(RunOutcome::InvalidParameters);
            }
        };

        if let Err(e) = self.services.notifier.initialize().await {
            notifier_failed(key, "initialize", &e);
        }

        let mut session = NormalizedSession::new(node, parameters);
        let mut run_context = self.manager.get_session(key).await?.run_context;
        let outcome = match dispatch(&mut session, &mut run_context, self.credentials.as_ref()) {
            Ok(()) => {
                let session = Arc::new(session);
                // Running before the engine sees the reporter, so a stop it
                // raises while starting up is not lost.
                self.manager
                    .update_session(key, |s| {
                        s.run_context = run_context;
                        s.session = Some(session.clone());
                        s.stop_requested = false;
                    })
                    .await?;
                self.manager.transition(key, SessionStatus::Running).await?;

                let run = SessionRun {
                    run_id,
                    session,
                    app_schema: Arc::new(definition.app_schema.clone()),
                    trading_system: Arc::new(definition.trading_system.clone()),
                    trading_engine: Arc::new(definition.trading_engine.clone()),
                    dependency_filter: Arc::new(definition.dependency_filter.clone()),
                    resume: definition.resume,
                    first_execution: definition.first_execution,
                    run_context,
                    reporter: self.reporter.clone(),
                };
                if self.services.engine.run(run).await {
                    RunOutcome::Started
                } else {
                    tracing::warn!(
                        target: "sessionctl.session",
                        stage = "session.engine",
                        session_key = key,
                        engine = self.services.engine.name(),
                        "execution engine declined the session"
                    );
                    RunOutcome::EngineDeclined
                }
            }
            Err(e) => {
                log_dispatch_failure(key, &e);
                RunOutcome::DispatchFailed
            }
        };

        if outcome != RunOutcome::Started {
            self.manager
                .update_session(key, |s| {
                    s.mark_stop_requested();
                })
                .await?;
            // An engine that asked to stop before declining is already Stopping.
            if let Some(SessionStatus::Starting | SessionStatus::Running) =
                self.manager.status(key).await
            {
                self.manager
                    .transition(key, SessionStatus::StoppedWithError)
                    .await?;
            }
        }

        self.notify(&format!(
            "{} '{}' is starting.",
            node.session_type, node.name
        ))
        .await;
        Ok(outcome)
    }

    /// Handles `Stop Session`, or a stop requested by an engine.
    ///
    /// The origin is raised on the Error channel: stop notices and errors
    /// share one outward signal.
    pub async fn on_stop(&self, origin: &str) -> Result<(), SessionError> {
        let key = self.session_key.as_str();
        let (session_type, name, node) = self.current_identity().await;

        self.notify(&format!("{session_type} '{name}' is stopping {origin}"))
            .await;
        if let Err(e) = self.services.notifier.finalize().await {
            notifier_failed(key, "finalize", &e);
        }
        self.services.engine.finalize(key).await;

        self.manager.request_stop(key).await?;
        self.reporter.report_error(Some(&node), origin).await;

        tracing::info!(
            target: "sessionctl.session",
            stage = "session.stop",
            session_key = key,
            origin,
            "session stopping"
        );
        Ok(())
    }

    /// Records an unexpected run-path failure.
    pub async fn fail(&self, error: &SessionError) {
        if let Err(e) = self
            .manager
            .fail_session(&self.session_key, error.to_string())
            .await
        {
            tracing::error!(
                target: "sessionctl.session",
                session_key = %self.session_key,
                error = %e,
                "could not record session failure"
            );
        }
    }

    // The accepted run's identity wins over the node the process started with.
    async fn current_identity(&self) -> (SessionType, String, NodeRef) {
        if let Ok(state) = self.manager.get_session(&self.session_key).await {
            if let Some(session) = state.session {
                return (session.session_type, session.name.clone(), session.node_ref());
            }
        }
        (
            self.process_session.session_type,
            self.process_session.name.clone(),
            self.process_session.node_ref(),
        )
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.services.notifier.send_message(text).await {
            notifier_failed(&self.session_key, "send_message", &e);
        }
    }
}

fn notifier_failed(session_key: &str, op: &'static str, error: &anyhow::Error) {
    tracing::warn!(
        target: "sessionctl.session",
        stage = "session.notifier",
        session_key,
        op,
        error = %error,
        "notifier call failed"
    );
}

// Credential problems stay off the Error channel.
fn log_dispatch_failure(session_key: &str, error: &DispatchError) {
    match error {
        DispatchError::MissingCredentials {
            session_type: SessionType::LiveTrading,
        } => tracing::error!(
            target: "sessionctl.session",
            stage = "session.dispatch",
            session_key,
            "key or secret not provided, cannot start live trading"
        ),
        DispatchError::MissingCredentials { session_type } => tracing::warn!(
            target: "sessionctl.session",
            stage = "session.dispatch",
            session_key,
            session_type = %session_type,
            "key or secret not provided, cannot run this session type"
        ),
    }
}
