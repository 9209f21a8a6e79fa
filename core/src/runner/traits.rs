use async_trait::async_trait;

use super::types::SessionRun;

/// Social/notification collaborator, told about start and stop in plain text.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn initialize(&self) -> anyhow::Result<()>;
    async fn send_message(&self, text: &str) -> anyhow::Result<()>;
    async fn finalize(&self) -> anyhow::Result<()>;
}

/// The engine that actually trades, tests or simulates a validated session.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Takes ownership of a dispatched session. Returning false keeps the
    /// session from being marked as running.
    async fn run(&self, run: SessionRun) -> bool;

    /// Releases whatever the engine holds for `session_key`.
    async fn finalize(&self, _session_key: &str) {}
}
