//! Trading session model: identity, parameter tree, validation and dispatch.

mod credentials;
pub mod datetime;
pub mod dispatch;
pub mod params;
mod payload;
mod schema;
pub mod timeframe;
mod types;
pub mod validate;

pub use credentials::Credentials;
pub use dispatch::{dispatch, RunContext};
pub use params::{
    AssetBalance, FeeStructure, Node, NodeRef, Parameters, RawParameters, Slippage, TimeFrame,
    TimeRange,
};
pub use payload::{RunDefinition, RunPayload};
pub use schema::AppSchemaMap;
pub use types::{session_key, NormalizedSession, SessionConfig, SessionNode, SessionType};
pub use validate::validate_parameters;
