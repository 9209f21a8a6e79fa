//! Session registry and process-wide stop flag

use super::session::SessionState;
use super::types::{SessionStatus, StateEvent};
use crate::session::RunContext;
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Owns every registered session.
///
/// Keys are never removed once registered. Each key's state is only written
/// by that key's own task, so the lock is never contended for long.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    sessions: RwLock<HashMap<String, SessionState>>,
    graceful_stop: AtomicBool,
    event_tx: broadcast::Sender<StateEvent>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(event_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_capacity.max(1));

        let inner = SessionManagerInner {
            sessions: RwLock::new(HashMap::new()),
            graceful_stop: AtomicBool::new(false),
            event_tx,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.inner.event_tx.subscribe()
    }

    fn emit_event(&self, event: StateEvent) {
        let _ = self.inner.event_tx.send(event);
    }

    /// Registers a new key. Returns false if the key is already known.
    pub async fn register(&self, session_key: &str, run_context: RunContext) -> bool {
        {
            let mut sessions = self.inner.sessions.write().await;
            if sessions.contains_key(session_key) {
                return false;
            }
            sessions.insert(
                session_key.to_string(),
                SessionState::new(session_key.to_string(), run_context),
            );
        }

        self.emit_event(StateEvent::SessionRegistered {
            session_key: session_key.to_string(),
            timestamp: Utc::now(),
        });
        true
    }

    pub async fn is_registered(&self, session_key: &str) -> bool {
        self.inner.sessions.read().await.contains_key(session_key)
    }

    pub async fn session_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.inner.sessions.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn get_session(&self, session_key: &str) -> Result<SessionState> {
        let sessions = self.inner.sessions.read().await;
        sessions
            .get(session_key)
            .cloned()
            .context("Session not found")
    }

    pub async fn status(&self, session_key: &str) -> Option<SessionStatus> {
        let sessions = self.inner.sessions.read().await;
        sessions.get(session_key).map(|s| s.status)
    }

    pub async fn stop_requested(&self, session_key: &str) -> bool {
        let sessions = self.inner.sessions.read().await;
        sessions
            .get(session_key)
            .map(|s| s.stop_requested)
            .unwrap_or(false)
    }

    pub async fn update_session<F, T>(&self, session_key: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut SessionState) -> T,
    {
        let mut sessions = self.inner.sessions.write().await;
        let session = sessions
            .get_mut(session_key)
            .context("Session not found")?;
        Ok(f(session))
    }

    /// Moves a session to `new_status`, validating the transition.
    pub async fn transition(&self, session_key: &str, new_status: SessionStatus) -> Result<()> {
        let old_status = self
            .update_session(session_key, |session| {
                let old = session.status;
                session.transition_to(new_status).map(|_| old)
            })
            .await??;

        tracing::debug!(
            target: "sessionctl.state",
            session_key,
            from = %old_status,
            to = %new_status,
            "status changed"
        );
        self.emit_event(StateEvent::StatusChanged {
            session_key: session_key.to_string(),
            old_status,
            new_status,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Sets `stop_requested` and moves a running session to `Stopping`.
    pub async fn request_stop(&self, session_key: &str) -> Result<()> {
        let (newly_set, old_status) = self
            .update_session(session_key, |session| {
                (session.mark_stop_requested(), session.status)
            })
            .await?;

        if newly_set {
            self.emit_event(StateEvent::StopRequested {
                session_key: session_key.to_string(),
                timestamp: Utc::now(),
            });
        }
        if old_status == SessionStatus::Running {
            self.transition(session_key, SessionStatus::Stopping).await?;
        }
        Ok(())
    }

    /// Records an unexpected run-path failure. A session caught mid-start is
    /// moved to `StoppedWithError`; other statuses are left alone.
    pub async fn fail_session(&self, session_key: &str, error: String) -> Result<()> {
        let status = self
            .status(session_key)
            .await
            .context("Session not found")?;
        self.update_session(session_key, |session| {
            session.mark_stop_requested();
        })
        .await?;
        if status == SessionStatus::Starting {
            self.transition(session_key, SessionStatus::StoppedWithError)
                .await?;
        }

        self.emit_event(StateEvent::SessionFailed {
            session_key: session_key.to_string(),
            error,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    pub fn request_graceful_stop(&self) {
        if !self.inner.graceful_stop.swap(true, Ordering::SeqCst) {
            tracing::info!(target: "sessionctl.state", "graceful stop requested");
            self.emit_event(StateEvent::GracefulStopRequested {
                timestamp: Utc::now(),
            });
        }
    }

    pub fn graceful_stop_requested(&self) -> bool {
        self.inner.graceful_stop.load(Ordering::SeqCst)
    }

    pub async fn get_session_stats(&self) -> SessionStats {
        let sessions = self.inner.sessions.read().await;
        let mut stats = SessionStats::default();

        for session in sessions.values() {
            match session.status {
                SessionStatus::Uninitialized => stats.uninitialized += 1,
                SessionStatus::Starting => stats.starting += 1,
                SessionStatus::Running => stats.running += 1,
                SessionStatus::StoppedWithError => stats.stopped_with_error += 1,
                SessionStatus::Stopping => stats.stopping += 1,
            }
        }

        stats
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub uninitialized: usize,
    pub starting: usize,
    pub running: usize,
    pub stopped_with_error: usize,
    pub stopping: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RunContext {
        RunContext {
            live_wait_time_ms: 1_000,
            normal_wait_time_ms: 2_000,
        }
    }

    #[tokio::test]
    async fn test_registry_is_append_only() {
        let manager = SessionManager::new();
        assert!(manager.register("a", ctx()).await);
        assert!(!manager.register("a", ctx()).await);
        assert!(manager.register("b", ctx()).await);
        assert_eq!(manager.session_keys().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_transition_and_stop() {
        let manager = SessionManager::new();
        manager.register("k", ctx()).await;

        manager.transition("k", SessionStatus::Starting).await.unwrap();
        manager.transition("k", SessionStatus::Running).await.unwrap();
        assert!(manager
            .transition("k", SessionStatus::Starting)
            .await
            .is_err());

        manager.request_stop("k").await.unwrap();
        assert_eq!(manager.status("k").await, Some(SessionStatus::Stopping));
        assert!(manager.stop_requested("k").await);

        // a second stop is harmless
        manager.request_stop("k").await.unwrap();
        assert_eq!(manager.status("k").await, Some(SessionStatus::Stopping));
    }

    #[tokio::test]
    async fn test_fail_session_from_starting() {
        let manager = SessionManager::new();
        manager.register("k", ctx()).await;
        let mut rx = manager.subscribe();

        manager.transition("k", SessionStatus::Starting).await.unwrap();
        manager.fail_session("k", "boom".into()).await.unwrap();
        assert_eq!(
            manager.status("k").await,
            Some(SessionStatus::StoppedWithError)
        );

        let mut saw_failure = false;
        while let Ok(ev) = rx.try_recv() {
            if let StateEvent::SessionFailed { error, .. } = ev {
                assert_eq!(error, "boom");
                saw_failure = true;
            }
        }
        assert!(saw_failure);
    }

    #[tokio::test]
    async fn test_event_subscription() {
        let manager = SessionManager::new();
        let mut rx = manager.subscribe();

        manager.register("k", ctx()).await;

        match rx.recv().await {
            Ok(StateEvent::SessionRegistered { session_key, .. }) => {
                assert_eq!(session_key, "k");
            }
            _ => panic!("Expected SessionRegistered event"),
        }
    }

    #[tokio::test]
    async fn test_graceful_stop_flag_and_stats() {
        let manager = SessionManager::new();
        manager.register("a", ctx()).await;
        manager.register("b", ctx()).await;
        manager.transition("b", SessionStatus::Starting).await.unwrap();

        assert!(!manager.graceful_stop_requested());
        manager.request_graceful_stop();
        assert!(manager.graceful_stop_requested());

        let stats = manager.get_session_stats().await;
        assert_eq!(stats.uninitialized, 1);
        assert_eq!(stats.starting, 1);
    }
}
