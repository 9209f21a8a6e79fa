use async_trait::async_trait;
use serde::Serialize;
use sessionctl_core::api::Notifier;
use std::{error::Error as StdError, fmt};

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookErrorKind {
    Timeout,
    Connect,
    Request,
    Status,
    Unknown,
}

impl WebhookErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WebhookErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct WebhookError {
    kind: WebhookErrorKind,
    status: Option<u16>,
    url: String,
    message: String,
    source: Option<reqwest::Error>,
}

impl WebhookError {
    pub fn kind(&self) -> WebhookErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        let kind = if err.is_timeout() {
            WebhookErrorKind::Timeout
        } else if err.is_connect() {
            WebhookErrorKind::Connect
        } else if err.is_request() {
            WebhookErrorKind::Request
        } else {
            WebhookErrorKind::Unknown
        };
        Self {
            kind,
            status: err.status().map(|s| s.as_u16()),
            url: url.to_string(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    fn status_error(status: u16, url: &str, preview: String) -> Self {
        Self {
            kind: WebhookErrorKind::Status,
            status: Some(status),
            url: url.to_string(),
            message: preview,
            source: None,
        }
    }
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "webhook error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        write!(f, " url={}: {}", self.url, self.message)
    }
}

impl StdError for WebhookError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().count() > BODY_PREVIEW_LIMIT {
        out.push_str("...");
    }
    out
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

/// Posts status messages as `{"text": ...}` to a chat webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    http: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self { url, http })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        if self.url.trim().is_empty() {
            anyhow::bail!("webhook url is empty");
        }
        Ok(())
    }

    async fn send_message(&self, text: &str) -> anyhow::Result<()> {
        let url = self.url.as_str();
        tracing::debug!(
            target: "sessionctl.notifier",
            stage = "notifier.webhook.in",
            url,
            text_len = text.len()
        );
        let resp = self
            .http
            .post(url)
            .json(&WebhookMessage { text })
            .send()
            .await
            .map_err(|err| WebhookError::from_reqwest(err, url))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WebhookError::status_error(status.as_u16(), url, preview_body(&body)).into());
        }
        tracing::debug!(
            target: "sessionctl.notifier",
            stage = "notifier.webhook.out",
            status = %status
        );
        Ok(())
    }

    async fn finalize(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preview_body_empty_and_truncated() {
        assert_eq!(preview_body("  "), "<empty body>");
        let preview = preview_body(&"a".repeat(BODY_PREVIEW_LIMIT + 10));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.len(), BODY_PREVIEW_LIMIT + 3);
    }

    #[test]
    fn test_error_display_status() {
        let err = WebhookError::status_error(502, "https://example.com/hook", "bad gateway".into());
        let msg = err.to_string();
        assert!(msg.contains("kind=status"));
        assert!(msg.contains("status=502"));
        assert!(msg.contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_send_message_posts_text() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/hook")
            .match_body(Matcher::Json(serde_json::json!({
                "text": "Paper Trading Session 'Test' is starting."
            })))
            .with_status(204)
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.url()), 1_000).unwrap();
        notifier.initialize().await.unwrap();
        notifier
            .send_message("Paper Trading Session 'Test' is starting.")
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_message_surfaces_status_errors() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/hook")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.url()), 1_000).unwrap();
        let err = notifier.send_message("hi").await.unwrap_err();
        let err = err.downcast_ref::<WebhookError>().unwrap();
        assert_eq!(err.kind(), WebhookErrorKind::Status);
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_initialize_rejects_empty_url() {
        let notifier = WebhookNotifier::new(" ".to_string(), 1_000).unwrap();
        assert!(notifier.initialize().await.is_err());
    }
}
