//! Parameter validation and normalization.
//!
//! Checks run in a fixed order and the first fatal problem wins. Optional
//! nodes and fields are filled in independently of their siblings.

use chrono::{DateTime, Utc};

use crate::error::{ValidationError, ValidationErrorKind};

use super::datetime::parse_datetime_ms;
use super::params::{
    AssetBalance, FeeStructure, Node, NodeRef, Parameters, RawAsset, RawTimeRange, Slippage,
    TimeFrame, TimeRange,
};
use super::timeframe::resolve_label;
use super::types::{SessionNode, SessionType};

pub fn validate_parameters(
    session: &SessionNode,
    now: DateTime<Utc>,
) -> Result<Parameters, ValidationError> {
    let Some(raw) = session.parameters.as_ref() else {
        return Err(ValidationError::new(
            ValidationErrorKind::MissingParameters,
            Some(session.node_ref()),
        ));
    };
    let params_ref = &raw.meta;

    let time_range = normalize_time_range(
        raw.time_range.as_ref(),
        session.session_type,
        now.timestamp_millis(),
        params_ref,
    )?;

    let Some(time_frame) = raw.time_frame.as_ref() else {
        return Err(fatal(ValidationErrorKind::MissingTimeFrame, params_ref));
    };
    let Some(label) = time_frame.config.label.clone() else {
        return Err(fatal(
            ValidationErrorKind::MissingTimeFrameLabel,
            &time_frame.meta,
        ));
    };
    let value = resolve_label(&label);
    if value.is_none() {
        tracing::warn!(
            target: "sessionctl.session",
            stage = "session.validate.time_frame",
            label = %label,
            "time frame label does not match any known period"
        );
    }
    let time_frame = time_frame.map(TimeFrame { label, value });

    let session_base_asset = normalize_asset(
        raw.session_base_asset.as_ref(),
        params_ref,
        ValidationErrorKind::MissingBaseAsset,
        ValidationErrorKind::MissingBaseInitialBalance,
    )?;
    let session_quoted_asset = normalize_asset(
        raw.session_quoted_asset.as_ref(),
        params_ref,
        ValidationErrorKind::MissingQuotedAsset,
        ValidationErrorKind::MissingQuotedInitialBalance,
    )?;

    let slippage = match raw.slippage.as_ref() {
        Some(node) => node.map(Slippage {
            position_rate: node.config.position_rate.unwrap_or(0.0),
            stop_loss: node.config.stop_loss.unwrap_or(0.0),
            take_profit: node.config.take_profit.unwrap_or(0.0),
        }),
        None => Node::synthesized("Missing Slippage", "Slippage", Slippage::default()),
    };

    let fee_structure = match raw.fee_structure.as_ref() {
        Some(node) => node.map(FeeStructure {
            maker: node.config.maker.unwrap_or(0.0),
            taker: node.config.taker.unwrap_or(0.0),
        }),
        None => Node::synthesized(
            "Missing Fee Structure",
            "Fee Structure",
            FeeStructure::default(),
        ),
    };

    Ok(Parameters {
        meta: raw.meta.clone(),
        time_range,
        time_frame,
        session_base_asset,
        session_quoted_asset,
        slippage,
        fee_structure,
    })
}

fn normalize_time_range(
    node: Option<&Node<RawTimeRange>>,
    session_type: SessionType,
    now_ms: i64,
    params_ref: &NodeRef,
) -> Result<Node<TimeRange>, ValidationError> {
    let (default_initial, default_final) = session_type.default_window(now_ms);

    let Some(node) = node else {
        return Ok(Node::synthesized(
            "Missing Time Range",
            "Time Range",
            TimeRange {
                initial_datetime: default_initial,
                final_datetime: default_final,
            },
        ));
    };

    let initial = node.config.initial_datetime.as_ref().and_then(parse_datetime_ms);
    if session_type.requires_initial_datetime() && initial.is_none() {
        return Err(fatal(ValidationErrorKind::InvalidInitialDatetime, params_ref));
    }
    let Some(final_datetime) = node.config.final_datetime.as_ref().and_then(parse_datetime_ms)
    else {
        return Err(fatal(ValidationErrorKind::InvalidFinalDatetime, params_ref));
    };

    // Only backtests require a parseable start; for the others an
    // unparseable start is treated like an unset one.
    Ok(node.map(TimeRange {
        initial_datetime: initial.unwrap_or(default_initial),
        final_datetime,
    }))
}

fn normalize_asset(
    node: Option<&Node<RawAsset>>,
    params_ref: &NodeRef,
    missing_node: ValidationErrorKind,
    missing_initial: ValidationErrorKind,
) -> Result<Node<AssetBalance>, ValidationError> {
    let Some(node) = node else {
        return Err(fatal(missing_node, params_ref));
    };
    let Some(initial_balance) = node.config.initial_balance else {
        return Err(fatal(missing_initial, &node.meta));
    };
    Ok(node.map(AssetBalance {
        initial_balance,
        minimum_balance: node.config.minimum_balance,
        maximum_balance: node.config.maximum_balance,
    }))
}

fn fatal(kind: ValidationErrorKind, node: &NodeRef) -> ValidationError {
    ValidationError::new(kind, Some(node.clone()))
}
