use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use sessionctl_core::api::{
    dispatch, validate_parameters, AppConfig, NormalizedSession, RunContext, RunDefinition,
    RunPayload,
};

use super::cli::ValidateArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateReport {
    pub session: NormalizedSession,
    pub run_context: RunContext,
    pub wait_time_ms: u64,
}

pub async fn validate(args: ValidateArgs, cfg: &AppConfig) -> Result<i32, CliError> {
    let now = match args.now.as_deref() {
        Some(s) => parse_now(s)?,
        None => Utc::now(),
    };
    let payload = read_payload(&args.payload).await?;
    let report = validate_payload(&payload, cfg, now)?;

    let out = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::Command(format!("encode report: {e}")))?;
    println!("{out}");
    Ok(0)
}

fn parse_now(s: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| CliError::Command(format!("--now {s:?} is not RFC 3339: {e}")))
}

async fn read_payload(path: &Path) -> Result<RunPayload, CliError> {
    let raw = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&raw)
        .map_err(|e| CliError::Command(format!("payload {}: {e}", path.display())))
}

/// Runs validation and dispatch exactly as a `Run Session` would, minus the engine.
pub fn validate_payload(
    payload: &RunPayload,
    cfg: &AppConfig,
    now: DateTime<Utc>,
) -> Result<ValidateReport, CliError> {
    let definition = RunDefinition::from_payload(payload)?;
    let parameters = validate_parameters(&definition.session, now)?;

    let mut session = NormalizedSession::new(&definition.session, parameters);
    let mut run_context = RunContext::from(&cfg.control);
    dispatch(
        &mut session,
        &mut run_context,
        cfg.credentials.credentials().as_ref(),
    )?;

    let wait_time_ms = run_context.wait_time_ms(session.session_type);
    tracing::debug!(
        target: "sessionctl.cli",
        session_key = %session.session_key,
        wait_time_ms,
        "payload validated"
    );
    Ok(ValidateReport {
        session,
        run_context,
        wait_time_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    fn payload(session: serde_json::Value) -> RunPayload {
        RunPayload {
            app_schema: "[]".to_string(),
            trading_system: "{}".to_string(),
            trading_engine: "{}".to_string(),
            session: session.to_string(),
            dependency_filter: String::new(),
            resume: false,
        }
    }

    fn session(session_type: &str) -> serde_json::Value {
        json!({
            "id": "s-1",
            "name": "CLI",
            "type": session_type,
            "config": { "balancePercentage": 10 },
            "parameters": {
                "timeFrame": { "config": { "label": "1h" } },
                "sessionBaseAsset": { "config": { "initialBalance": 2 } },
                "sessionQuotedAsset": { "config": { "initialBalance": 1000 } }
            }
        })
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_paper_trading_report() {
        let report =
            validate_payload(&payload(session("Paper Trading Session")), &AppConfig::default(), now())
                .unwrap();
        assert_eq!(report.wait_time_ms, 3_600_000);
        assert_eq!(
            report.session.parameters.time_range.config.initial_datetime,
            now().timestamp_millis()
        );
        assert_eq!(report.session.folder_name, "Paper-Trading-Session-s-1");
    }

    #[test]
    fn test_forward_testing_needs_credentials() {
        let p = payload(session("Forward Testing Session"));
        let err = validate_payload(&p, &AppConfig::default(), now()).unwrap_err();
        assert_eq!(err.exit_code(), 31);

        let mut cfg = AppConfig::default();
        cfg.credentials.key = Some("k".into());
        cfg.credentials.secret = Some("s".into());
        let report = validate_payload(&p, &cfg, now()).unwrap();
        assert_eq!(
            report.session.parameters.session_quoted_asset.config.initial_balance,
            100.0
        );
    }

    #[test]
    fn test_missing_parameters_is_a_validation_error() {
        let mut s = session("Backtesting Session");
        s.as_object_mut().unwrap().remove("parameters");
        let err = validate_payload(&payload(s), &AppConfig::default(), now()).unwrap_err();
        assert_eq!(err.exit_code(), 30);
        assert!(err.to_string().contains("Session Node with no Parameters."));
    }

    #[tokio::test]
    async fn test_reads_payload_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        let body = serde_json::to_string(&payload(session("Backtesting Session"))).unwrap();
        f.write_all(body.as_bytes()).unwrap();

        let p = read_payload(f.path()).await.unwrap();
        assert!(p.session.contains("\"Backtesting Session\""));
        assert!(parse_now("yesterday").is_err());
    }
}
