pub mod log;
pub mod webhook;

pub use log::LogNotifier;
pub use webhook::{WebhookError, WebhookErrorKind, WebhookNotifier};
