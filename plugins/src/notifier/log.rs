use async_trait::async_trait;
use sessionctl_core::api::Notifier;

/// Writes status messages to the tracing log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send_message(&self, text: &str) -> anyhow::Result<()> {
        tracing::info!(target: "sessionctl.notifier", stage = "notifier.log", "{text}");
        Ok(())
    }

    async fn finalize(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
