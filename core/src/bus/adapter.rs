use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};

use super::types::{Notification, OutboundEvent, SessionCommand};
use crate::error::BusError;

/// In-process event bus: one command route per session key in, one
/// broadcast stream of notifications out.
#[derive(Clone)]
pub struct SessionBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    routes: RwLock<HashMap<String, mpsc::Sender<SessionCommand>>>,
    outbound: broadcast::Sender<OutboundEvent>,
    command_capacity: usize,
}

impl SessionBus {
    pub fn new(command_capacity: usize, notification_capacity: usize) -> Self {
        let (outbound, _) = broadcast::channel(notification_capacity.max(1));
        Self {
            inner: Arc::new(BusInner {
                routes: RwLock::new(HashMap::new()),
                outbound,
                command_capacity: command_capacity.max(1),
            }),
        }
    }

    /// Opens the command route for `session_key`. Only one subscriber per key.
    pub async fn subscribe(
        &self,
        session_key: &str,
    ) -> Result<mpsc::Receiver<SessionCommand>, BusError> {
        let mut routes = self.inner.routes.write().await;
        if routes
            .get(session_key)
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
        {
            return Err(BusError::AlreadySubscribed(session_key.to_string()));
        }
        let (tx, rx) = mpsc::channel(self.inner.command_capacity);
        routes.insert(session_key.to_string(), tx);
        Ok(rx)
    }

    /// Delivers a command to the session's subscriber, in send order.
    pub async fn send(&self, session_key: &str, command: SessionCommand) -> Result<(), BusError> {
        let tx = {
            let routes = self.inner.routes.read().await;
            routes
                .get(session_key)
                .cloned()
                .ok_or_else(|| BusError::NoRoute(session_key.to_string()))?
        };
        tracing::debug!(
            target: "sessionctl.bus",
            session_key,
            event = command.event_name(),
            "command in"
        );
        tx.send(command)
            .await
            .map_err(|_| BusError::Closed(session_key.to_string()))
    }

    /// Raises a notification for `session_key`. Dropped if nobody listens.
    pub fn raise(&self, session_key: &str, notification: Notification) {
        let _ = self.inner.outbound.send(OutboundEvent {
            session_key: session_key.to_string(),
            notification,
        });
    }

    pub fn notifications(&self) -> broadcast::Receiver<OutboundEvent> {
        self.inner.outbound.subscribe()
    }

    /// Drops the command route. The subscriber sees end-of-stream once
    /// already queued commands are drained.
    pub async fn unsubscribe(&self, session_key: &str) -> bool {
        self.inner.routes.write().await.remove(session_key).is_some()
    }
}
