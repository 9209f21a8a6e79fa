use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SessionError;

use super::schema::AppSchemaMap;
use super::types::SessionNode;

/// Body of a `Run Session` event. Every definition travels as a
/// JSON-encoded string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPayload {
    pub app_schema: String,
    pub trading_system: String,
    pub trading_engine: String,
    pub session: String,
    #[serde(default)]
    pub dependency_filter: String,
    #[serde(default)]
    pub resume: bool,
}

/// Decoded `RunPayload`.
#[derive(Debug, Clone)]
pub struct RunDefinition {
    pub app_schema: AppSchemaMap,
    pub trading_system: Value,
    pub trading_engine: Value,
    pub session: SessionNode,
    /// Opaque to the controller; forwarded to engines.
    pub dependency_filter: Value,
    pub resume: bool,
    pub first_execution: bool,
}

impl RunDefinition {
    pub fn from_payload(payload: &RunPayload) -> Result<Self, SessionError> {
        let schema: Vec<Value> = decode("appSchema", &payload.app_schema)?;
        let dependency_filter = if payload.dependency_filter.trim().is_empty() {
            Value::Null
        } else {
            decode("dependencyFilter", &payload.dependency_filter)?
        };
        Ok(Self {
            app_schema: AppSchemaMap::from_definitions(schema),
            trading_system: decode("tradingSystem", &payload.trading_system)?,
            trading_engine: decode("tradingEngine", &payload.trading_engine)?,
            session: decode("session", &payload.session)?,
            dependency_filter,
            resume: payload.resume,
            first_execution: true,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(field: &'static str, raw: &str) -> Result<T, SessionError> {
    serde_json::from_str(raw).map_err(|source| SessionError::Payload { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use serde_json::json;

    fn payload(session: Value) -> RunPayload {
        RunPayload {
            app_schema: json!([{ "type": "Backtesting Session" }]).to_string(),
            trading_system: json!({ "name": "TS" }).to_string(),
            trading_engine: json!({ "name": "TE" }).to_string(),
            session: session.to_string(),
            dependency_filter: String::new(),
            resume: true,
        }
    }

    #[test]
    fn test_decodes_every_definition() {
        let def = RunDefinition::from_payload(&payload(json!({
            "id": "1", "name": "BT", "type": "Backtesting Session"
        })))
        .unwrap();
        assert_eq!(def.session.session_type, SessionType::Backtesting);
        assert!(def.app_schema.get("Backtesting Session").is_some());
        assert_eq!(def.trading_engine["name"], "TE");
        assert_eq!(def.dependency_filter, Value::Null);
        assert!(def.resume);
        assert!(def.first_execution);
    }

    #[test]
    fn test_reports_the_broken_field() {
        let mut p = payload(json!({ "id": "1", "name": "BT", "type": "Backtesting Session" }));
        p.trading_system = "{not json".to_string();
        match RunDefinition::from_payload(&p) {
            Err(SessionError::Payload { field, .. }) => assert_eq!(field, "tradingSystem"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_session_type_is_a_payload_error() {
        let p = payload(json!({ "id": "1", "name": "X", "type": "Replay Session" }));
        assert!(matches!(
            RunDefinition::from_payload(&p),
            Err(SessionError::Payload { field: "session", .. })
        ));
    }

    #[test]
    fn test_wire_payload_is_camel_case() {
        let p: RunPayload = serde_json::from_value(json!({
            "appSchema": "[]",
            "tradingSystem": "{}",
            "tradingEngine": "{}",
            "session": "{}",
            "dependencyFilter": "{\"market\":\"BTC/USDT\"}"
        }))
        .unwrap();
        assert!(!p.resume);
        assert_eq!(p.dependency_filter, "{\"market\":\"BTC/USDT\"}");
    }
}
