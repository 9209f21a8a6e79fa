//! Session-type dispatch: preconditions and side effects per variant.

use serde::{Deserialize, Serialize};

use crate::config::ControlConfig;
use crate::error::DispatchError;

use super::credentials::Credentials;
use super::types::{NormalizedSession, SessionType};

/// Poll intervals owned by one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    pub live_wait_time_ms: u64,
    pub normal_wait_time_ms: u64,
}

impl RunContext {
    /// Interval the execution loop should sleep between cycles.
    pub fn wait_time_ms(&self, session_type: SessionType) -> u64 {
        match session_type {
            SessionType::LiveTrading => self.live_wait_time_ms,
            SessionType::Backtesting | SessionType::ForwardTesting | SessionType::PaperTrading => {
                self.normal_wait_time_ms
            }
        }
    }
}

impl From<&ControlConfig> for RunContext {
    fn from(cfg: &ControlConfig) -> Self {
        Self {
            live_wait_time_ms: cfg.live_wait_time_ms,
            normal_wait_time_ms: cfg.normal_wait_time_ms,
        }
    }
}

pub const DEFAULT_BALANCE_PERCENTAGE: f64 = 100.0;

/// Applies the session type's contract to `session` and `ctx`.
///
/// Credential checks run before anything is mutated, so a failed dispatch
/// leaves both untouched.
pub fn dispatch(
    session: &mut NormalizedSession,
    ctx: &mut RunContext,
    credentials: Option<&Credentials>,
) -> Result<(), DispatchError> {
    let session_type = session.session_type;
    if session_type.requires_credentials() && credentials.is_none() {
        return Err(DispatchError::MissingCredentials { session_type });
    }

    let time_frame = session.parameters.time_frame.config.value;
    match session_type {
        SessionType::Backtesting => {}
        SessionType::LiveTrading => {
            set_wait_time(&mut ctx.live_wait_time_ms, time_frame, session);
        }
        SessionType::ForwardTesting => {
            let percentage = session
                .config
                .balance_percentage
                .unwrap_or(DEFAULT_BALANCE_PERCENTAGE);
            if session.scale_balances(percentage) {
                tracing::info!(
                    target: "sessionctl.session",
                    stage = "session.dispatch.scale",
                    session_key = %session.session_key,
                    percentage,
                    "balances scaled for forward testing"
                );
            }
            set_wait_time(&mut ctx.normal_wait_time_ms, time_frame, session);
        }
        SessionType::PaperTrading => {
            set_wait_time(&mut ctx.normal_wait_time_ms, time_frame, session);
        }
    }
    Ok(())
}

// An unresolved time frame keeps the configured interval.
fn set_wait_time(slot: &mut u64, time_frame: Option<u64>, session: &NormalizedSession) {
    match time_frame {
        Some(ms) => *slot = ms,
        None => tracing::warn!(
            target: "sessionctl.session",
            stage = "session.dispatch.wait_time",
            session_key = %session.session_key,
            label = %session.parameters.time_frame.config.label,
            kept_ms = *slot,
            "time frame unresolved, keeping configured wait time"
        ),
    }
}
