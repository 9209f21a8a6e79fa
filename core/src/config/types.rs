use serde::{Deserialize, Serialize};

use crate::session::Credentials;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub control: ControlConfig,

    #[serde(default)]
    pub events_out: EventsOutConfig,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            control: ControlConfig::default(),
            events_out: EventsOutConfig::default(),
            credentials: CredentialsConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "sessionctl_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Session control knobs.
///
/// The wait times seed every session's `RunContext`; dispatch overwrites them
/// per session with the resolved time frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    #[serde(default = "default_live_wait_time_ms")]
    pub live_wait_time_ms: u64,

    #[serde(default = "default_normal_wait_time_ms")]
    pub normal_wait_time_ms: u64,

    #[serde(default = "default_command_channel_capacity")]
    pub command_channel_capacity: usize,

    #[serde(default = "default_notification_channel_capacity")]
    pub notification_channel_capacity: usize,

    #[serde(default = "default_state_event_capacity")]
    pub state_event_capacity: usize,
}

fn default_live_wait_time_ms() -> u64 {
    60_000
}

fn default_normal_wait_time_ms() -> u64 {
    60_000
}

fn default_command_channel_capacity() -> usize {
    64
}

fn default_notification_channel_capacity() -> usize {
    1024
}

fn default_state_event_capacity() -> usize {
    1000
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            live_wait_time_ms: default_live_wait_time_ms(),
            normal_wait_time_ms: default_normal_wait_time_ms(),
            command_channel_capacity: default_command_channel_capacity(),
            notification_channel_capacity: default_notification_channel_capacity(),
            state_event_capacity: default_state_event_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsOutConfig {
    pub enabled: bool,
    /// File path, or `stdout:` to stream to standard output.
    pub path: String,
    pub channel_capacity: usize,
    pub drop_when_full: bool,
}

impl Default for EventsOutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "./session.events.jsonl".to_string(),
            channel_capacity: 2048,
            drop_when_full: true,
        }
    }
}

/// Exchange API credentials required by live and forward-testing sessions.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
}

impl CredentialsConfig {
    /// Returns credentials only when both halves are present and non-blank.
    pub fn credentials(&self) -> Option<Credentials> {
        let key = self.key.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let secret = self
            .secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())?;
        Some(Credentials::new(key.to_string(), secret.to_string()))
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("key", &self.key)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// Status messages go to the tracing log only.
    Log,
    /// Status messages are POSTed as `{"text": ...}` to `url`.
    Webhook(WebhookNotifierConfig),
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self::Log
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookNotifierConfig {
    pub url: String,
    #[serde(default = "default_webhook_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_webhook_timeout_ms() -> u64 {
    5_000
}
