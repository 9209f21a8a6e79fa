use anyhow::Result;
use std::sync::Arc;

use sessionctl_core::api::{AppConfig, ExecutionEngine, Notifier, NotifierConfig};

use crate::engine::DryRunEngine;
use crate::notifier::{LogNotifier, WebhookNotifier};

pub fn build_notifier(cfg: &AppConfig) -> Result<Arc<dyn Notifier>> {
    match &cfg.notifier {
        NotifierConfig::Log => Ok(Arc::new(LogNotifier)),
        NotifierConfig::Webhook(w) => Ok(Arc::new(WebhookNotifier::new(
            w.url.clone(),
            w.timeout_ms,
        )?)),
    }
}

pub fn build_engine(_cfg: &AppConfig) -> Arc<dyn ExecutionEngine> {
    Arc::new(DryRunEngine::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionctl_core::api::WebhookNotifierConfig;

    #[test]
    fn test_default_config_builds_log_notifier() {
        let cfg = AppConfig::default();
        assert_eq!(build_notifier(&cfg).unwrap().name(), "log");
        assert_eq!(build_engine(&cfg).name(), "dry_run");
    }

    #[test]
    fn test_webhook_provider_builds_webhook_notifier() {
        let mut cfg = AppConfig::default();
        cfg.notifier = NotifierConfig::Webhook(WebhookNotifierConfig {
            url: "http://127.0.0.1:9/hook".to_string(),
            timeout_ms: 100,
        });
        assert_eq!(build_notifier(&cfg).unwrap().name(), "webhook");
    }
}
