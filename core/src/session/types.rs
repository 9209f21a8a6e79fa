//! Session identity and the normalized session handed to engines.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::datetime::ONE_YEAR_MS;
use super::params::{NodeRef, Parameters, RawParameters};

/// The four session behaviors. The wire names are the node types used by the
/// UI; the historical "Fordward" spelling is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "Backtesting Session")]
    Backtesting,
    #[serde(rename = "Live Trading Session")]
    LiveTrading,
    #[serde(
        rename = "Forward Testing Session",
        alias = "Fordward Testing Session"
    )]
    ForwardTesting,
    #[serde(rename = "Paper Trading Session")]
    PaperTrading,
}

impl SessionType {
    /// Parses a node type as sent by the UI.
    pub fn from_wire(type_name: &str) -> Option<Self> {
        match type_name {
            "Backtesting Session" => Some(Self::Backtesting),
            "Live Trading Session" => Some(Self::LiveTrading),
            "Forward Testing Session" | "Fordward Testing Session" => Some(Self::ForwardTesting),
            "Paper Trading Session" => Some(Self::PaperTrading),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backtesting => "Backtesting Session",
            Self::LiveTrading => "Live Trading Session",
            Self::ForwardTesting => "Forward Testing Session",
            Self::PaperTrading => "Paper Trading Session",
        }
    }

    /// Only backtests replay a past window, so only they need a real start date.
    pub fn requires_initial_datetime(self) -> bool {
        matches!(self, Self::Backtesting)
    }

    pub fn requires_credentials(self) -> bool {
        matches!(self, Self::LiveTrading | Self::ForwardTesting)
    }

    /// `(initial, final)` in epoch milliseconds for datetimes left unset.
    pub fn default_window(self, now_ms: i64) -> (i64, i64) {
        match self {
            Self::Backtesting => (now_ms - ONE_YEAR_MS, now_ms),
            Self::LiveTrading | Self::ForwardTesting | Self::PaperTrading => {
                (now_ms, now_ms + ONE_YEAR_MS)
            }
        }
    }

    /// Directory-safe form: the first two spaces become hyphens.
    pub fn folder_prefix(self) -> String {
        self.as_str().replacen(' ', "-", 2)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_percentage: Option<f64>,
}

/// A session node as it arrives from the UI, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SessionNodeWire", into = "SessionNodeWire")]
pub struct SessionNode {
    pub id: String,
    pub name: String,
    /// The node type exactly as received. The UI correlates on it, spelling
    /// included.
    pub type_name: String,
    pub session_type: SessionType,
    pub config: SessionConfig,
    pub parameters: Option<RawParameters>,
}

#[derive(Serialize, Deserialize)]
struct SessionNodeWire {
    id: String,
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    config: SessionConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameters: Option<RawParameters>,
}

impl TryFrom<SessionNodeWire> for SessionNode {
    type Error = String;

    fn try_from(wire: SessionNodeWire) -> Result<Self, Self::Error> {
        let session_type = SessionType::from_wire(&wire.type_name)
            .ok_or_else(|| format!("unknown session type {:?}", wire.type_name))?;
        Ok(Self {
            id: wire.id,
            name: wire.name,
            type_name: wire.type_name,
            session_type,
            config: wire.config,
            parameters: wire.parameters,
        })
    }
}

impl From<SessionNode> for SessionNodeWire {
    fn from(node: SessionNode) -> Self {
        Self {
            id: node.id,
            name: node.name,
            type_name: node.type_name,
            config: node.config,
            parameters: node.parameters,
        }
    }
}

impl SessionNode {
    pub fn new(id: &str, name: &str, session_type: SessionType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            type_name: session_type.as_str().to_string(),
            session_type,
            config: SessionConfig::default(),
            parameters: None,
        }
    }

    /// Correlation key used on the bus and in the registry.
    pub fn session_key(&self) -> String {
        session_key(&self.name, &self.type_name, &self.id)
    }

    /// Namespace for the session's logs, reports and output.
    pub fn folder_name(&self) -> String {
        let suffix = self.config.folder_name.as_deref().unwrap_or(&self.id);
        format!("{}-{}", self.session_type.folder_prefix(), suffix)
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            id: Some(self.id.clone()),
            name: Some(self.name.clone()),
            node_type: Some(self.type_name.clone()),
        }
    }
}

pub fn session_key(name: &str, type_name: &str, id: &str) -> String {
    format!("{name}-{type_name}-{id}")
}

/// A session whose parameters passed validation. Built fresh for every run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSession {
    pub session_key: String,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub config: SessionConfig,
    pub folder_name: String,
    pub parameters: Parameters,
    #[serde(skip)]
    balances_scaled: bool,
}

impl NormalizedSession {
    pub fn new(node: &SessionNode, parameters: Parameters) -> Self {
        Self {
            session_key: node.session_key(),
            id: node.id.clone(),
            name: node.name.clone(),
            session_type: node.session_type,
            config: node.config.clone(),
            folder_name: node.folder_name(),
            parameters,
            balances_scaled: false,
        }
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            id: Some(self.id.clone()),
            name: Some(self.name.clone()),
            node_type: Some(self.session_type.as_str().to_string()),
        }
    }

    /// Scales every balance of both assets by `percentage / 100`.
    ///
    /// Returns false without touching anything if the balances were already
    /// scaled for this run.
    pub fn scale_balances(&mut self, percentage: f64) -> bool {
        if self.balances_scaled {
            return false;
        }
        let factor = percentage / 100.0;
        self.parameters.session_base_asset.config.scale(factor);
        self.parameters.session_quoted_asset.config.scale(factor);
        self.balances_scaled = true;
        true
    }
}
