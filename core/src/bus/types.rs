use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BusError;
use crate::session::{NodeRef, RunPayload};

pub const RUN_SESSION_EVENT: &str = "Run Session";
pub const STOP_SESSION_EVENT: &str = "Stop Session";

/// Origin reported when the UI stops a session.
pub const UI_STOP_ORIGIN: &str = "Session Stopped From the User Interface.";

/// Inbound commands for one session key.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Run(Box<RunPayload>),
    Stop { origin: String },
}

impl SessionCommand {
    /// Builds a command from its event name and optional JSON payload.
    pub fn from_event(event: &str, payload: Option<Value>) -> Result<Self, BusError> {
        match event {
            RUN_SESSION_EVENT => {
                let payload = payload.ok_or_else(|| BusError::InvalidPayload {
                    event: event.to_string(),
                    message: "missing payload".to_string(),
                })?;
                let payload: RunPayload =
                    serde_json::from_value(payload).map_err(|e| BusError::InvalidPayload {
                        event: event.to_string(),
                        message: e.to_string(),
                    })?;
                Ok(Self::Run(Box::new(payload)))
            }
            STOP_SESSION_EVENT => {
                let origin = payload
                    .as_ref()
                    .and_then(|p| p.get("origin"))
                    .and_then(Value::as_str)
                    .unwrap_or(UI_STOP_ORIGIN)
                    .to_string();
                Ok(Self::Stop { origin })
            }
            other => Err(BusError::UnknownEvent(other.to_string())),
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Run(_) => RUN_SESSION_EVENT,
            Self::Stop { .. } => STOP_SESSION_EVENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatEvent {
    /// Seconds of the current wall-clock minute, 0-59.
    pub seconds: u32,
    pub processing_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub error_message: String,
}

impl ErrorEvent {
    pub fn new(node: Option<&NodeRef>, message: impl Into<String>) -> Self {
        let error_message = message.into();
        match node {
            Some(n) => Self {
                node_name: n.name.clone(),
                node_type: n.node_type.clone(),
                node_id: n.id.clone(),
                error_message,
            },
            None => Self {
                node_name: None,
                node_type: None,
                node_id: None,
                error_message,
            },
        }
    }
}

/// Outbound notifications. Stop notices travel on the Error channel too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum Notification {
    Heartbeat(HeartbeatEvent),
    Error(ErrorEvent),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEvent {
    pub session_key: String,
    #[serde(flatten)]
    pub notification: Notification,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_event_without_node_only_has_message() {
        let ev = ErrorEvent::new(None, "stopped");
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({ "errorMessage": "stopped" })
        );
    }

    #[test]
    fn test_error_event_with_node_context() {
        let node = NodeRef {
            id: Some("n1".into()),
            name: Some("Fees".into()),
            node_type: Some("Fee Structure".into()),
        };
        let ev = ErrorEvent::new(Some(&node), "bad");
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({ "nodeName": "Fees", "nodeType": "Fee Structure", "nodeId": "n1", "errorMessage": "bad" })
        );
    }

    #[test]
    fn test_outbound_event_wire_shape() {
        let ev = OutboundEvent {
            session_key: "k".into(),
            notification: Notification::Error(ErrorEvent::new(None, "x")),
        };
        assert_eq!(
            serde_json::to_value(&ev).unwrap(),
            json!({ "sessionKey": "k", "event": "Error", "data": { "errorMessage": "x" } })
        );
    }

    #[test]
    fn test_commands_from_events() {
        let stop = SessionCommand::from_event(STOP_SESSION_EVENT, None).unwrap();
        match stop {
            SessionCommand::Stop { origin } => assert_eq!(origin, UI_STOP_ORIGIN),
            other => panic!("unexpected: {other:?}"),
        }

        let run = SessionCommand::from_event(
            RUN_SESSION_EVENT,
            Some(json!({
                "appSchema": "[]", "tradingSystem": "{}", "tradingEngine": "{}", "session": "{}"
            })),
        )
        .unwrap();
        assert_eq!(run.event_name(), RUN_SESSION_EVENT);

        assert!(matches!(
            SessionCommand::from_event(RUN_SESSION_EVENT, None),
            Err(BusError::InvalidPayload { .. })
        ));
        assert_eq!(
            SessionCommand::from_event("Pause Session", None).unwrap_err(),
            BusError::UnknownEvent("Pause Session".into())
        );
    }
}
