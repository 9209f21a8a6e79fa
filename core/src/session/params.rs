//! Session parameter tree, raw (as received) and normalized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of a node in the UI's hierarchy, used as error context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub node_type: Option<String>,
}

impl NodeRef {
    pub fn named(name: &str, node_type: &str) -> Self {
        Self {
            id: None,
            name: Some(name.to_string()),
            node_type: Some(node_type.to_string()),
        }
    }
}

/// A `{id, name, type, config}` node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node<C> {
    #[serde(flatten)]
    pub meta: NodeRef,
    #[serde(default)]
    pub config: C,
}

impl<C> Node<C> {
    pub fn synthesized(name: &str, node_type: &str, config: C) -> Self {
        Self {
            meta: NodeRef::named(name, node_type),
            config,
        }
    }

    /// Keeps the node identity, swaps the config.
    pub fn map<D>(&self, config: D) -> Node<D> {
        Node {
            meta: self.meta.clone(),
            config,
        }
    }
}

// Raw configs: everything optional, datetimes untyped.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTimeRange {
    #[serde(default)]
    pub initial_datetime: Option<Value>,
    #[serde(default)]
    pub final_datetime: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTimeFrame {
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAsset {
    #[serde(default)]
    pub initial_balance: Option<f64>,
    #[serde(default)]
    pub minimum_balance: Option<f64>,
    #[serde(default)]
    pub maximum_balance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSlippage {
    #[serde(default)]
    pub position_rate: Option<f64>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeeStructure {
    #[serde(default)]
    pub maker: Option<f64>,
    #[serde(default)]
    pub taker: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParameters {
    #[serde(flatten)]
    pub meta: NodeRef,
    #[serde(default)]
    pub time_range: Option<Node<RawTimeRange>>,
    #[serde(default)]
    pub time_frame: Option<Node<RawTimeFrame>>,
    #[serde(default)]
    pub session_base_asset: Option<Node<RawAsset>>,
    #[serde(default)]
    pub session_quoted_asset: Option<Node<RawAsset>>,
    #[serde(default)]
    pub slippage: Option<Node<RawSlippage>>,
    #[serde(default)]
    pub fee_structure: Option<Node<RawFeeStructure>>,
}

// Normalized configs.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    /// Epoch milliseconds.
    pub initial_datetime: i64,
    /// Epoch milliseconds.
    pub final_datetime: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeFrame {
    pub label: String,
    /// Duration in milliseconds; `None` when the label is not a known period.
    pub value: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    pub initial_balance: f64,
    pub minimum_balance: Option<f64>,
    pub maximum_balance: Option<f64>,
}

impl AssetBalance {
    pub fn scale(&mut self, factor: f64) {
        self.initial_balance *= factor;
        if let Some(v) = self.minimum_balance.as_mut() {
            *v *= factor;
        }
        if let Some(v) = self.maximum_balance.as_mut() {
            *v *= factor;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slippage {
    pub position_rate: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStructure {
    pub maker: f64,
    pub taker: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    #[serde(flatten)]
    pub meta: NodeRef,
    pub time_range: Node<TimeRange>,
    pub time_frame: Node<TimeFrame>,
    pub session_base_asset: Node<AssetBalance>,
    pub session_quoted_asset: Node<AssetBalance>,
    pub slippage: Node<Slippage>,
    pub fee_structure: Node<FeeStructure>,
}
