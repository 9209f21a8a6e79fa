use crate::bus::SessionBus;
use crate::config::AppConfig;
use crate::error::InitError;
use crate::events_out::{start_events_out, EventsOutTx};
use crate::runner::{ExecutionEngine, Notifier};
use crate::session::Credentials;
use crate::state::SessionManager;
use std::sync::Arc;

#[derive(Clone)]
pub struct Services {
    pub notifier: Arc<dyn Notifier>,
    pub engine: Arc<dyn ExecutionEngine>,
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services>;
}

/// Process-level wiring shared by every session.
#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    events_out: Option<EventsOutTx>,
    manager: SessionManager,
    bus: SessionBus,
    services: Services,
}

impl AppContext {
    pub async fn new(cfg: AppConfig, factory: &dyn ServicesFactory) -> Result<Self, InitError> {
        let services = factory.build_services(&cfg).await?;
        Self::with_services(cfg, services).await
    }

    pub async fn with_services(cfg: AppConfig, services: Services) -> Result<Self, InitError> {
        let events_out = start_events_out(&cfg.events_out)
            .await
            .map_err(InitError::EventsOut)?;
        let manager = SessionManager::with_capacity(cfg.control.state_event_capacity);
        let bus = SessionBus::new(
            cfg.control.command_channel_capacity,
            cfg.control.notification_channel_capacity,
        );
        Ok(Self {
            cfg,
            events_out,
            manager,
            bus,
            services,
        })
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn events_out(&self) -> Option<EventsOutTx> {
        self.events_out.clone()
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn bus(&self) -> &SessionBus {
        &self.bus
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.cfg.credentials.credentials()
    }
}
