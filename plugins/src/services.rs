//! ServicesFactory implementation: builds the notifier and execution engine from config.
use async_trait::async_trait;
use sessionctl_core::api::{AppConfig, Services, ServicesFactory};

use crate::factory;

pub struct PluginServicesFactory;

impl Default for PluginServicesFactory {
    fn default() -> Self {
        Self
    }
}

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> anyhow::Result<Services> {
        let notifier = factory::build_notifier(cfg)?;
        let engine = factory::build_engine(cfg);
        tracing::debug!(
            target: "sessionctl.plugins",
            notifier = notifier.name(),
            engine = engine.name(),
            "services built"
        );
        Ok(Services { notifier, engine })
    }
}
