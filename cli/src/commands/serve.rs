use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use sessionctl_core::api::{
    initialize, spawn_mirror, AppContext, BusError, SessionCommand, SessionHandle, SessionNode,
    SessionStatus,
};

use super::cli::ServeArgs;
use crate::error::CliError;

/// One stdin line: `{"event": "Run Session", "payload": {...}}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InboundLine {
    event: String,
    #[serde(default)]
    payload: Option<Value>,
    /// Routes to another registered key; defaults to the served session.
    #[serde(default)]
    session_key: Option<String>,
}

/// Parses a stdin line. Blank lines yield `None`.
pub fn parse_command_line(
    line: &str,
) -> Result<Option<(Option<String>, SessionCommand)>, BusError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let inbound: InboundLine =
        serde_json::from_str(line).map_err(|e| BusError::InvalidPayload {
            event: "<line>".to_string(),
            message: e.to_string(),
        })?;
    let command = SessionCommand::from_event(&inbound.event, inbound.payload)?;
    Ok(Some((inbound.session_key, command)))
}

pub async fn serve(args: ServeArgs, ctx: AppContext) -> Result<i32, CliError> {
    let node = read_session(&args.session).await?;
    let mirror = ctx
        .events_out()
        .map(|out| spawn_mirror(out, ctx.bus(), ctx.manager()));
    let handle = initialize(&ctx, Some(node)).await?;

    tracing::info!(
        target: "sessionctl.cli",
        stage = "serve.start",
        session_key = handle.key(),
        "serving session; reading commands from stdin"
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let interrupted = pump_commands(stdin, &ctx, &handle).await?;
    if !interrupted {
        wait_until_idle(&ctx, &handle).await;
    }

    let status = handle.status().await;
    handle.close().await;
    if let Some(mirror) = mirror {
        // Give the mirror a moment to flush what is already queued.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        mirror.abort();
    }

    tracing::info!(
        target: "sessionctl.cli",
        stage = "serve.end",
        status = ?status,
        "serve finished"
    );
    Ok(match status {
        Some(SessionStatus::StoppedWithError) => 1,
        _ => 0,
    })
}

async fn read_session(path: &Path) -> Result<SessionNode, CliError> {
    let raw = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&raw)
        .map_err(|e| CliError::Command(format!("session {}: {e}", path.display())))
}

/// Forwards stdin commands to the bus until EOF. Returns true when Ctrl+C
/// ended the loop.
async fn pump_commands<R>(
    reader: R,
    ctx: &AppContext,
    handle: &SessionHandle,
) -> Result<bool, CliError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(false);
                };
                forward_line(&line, ctx, handle).await;
            }
            _ = tokio::signal::ctrl_c() => {
                graceful_stop(ctx).await;
                return Ok(true);
            }
        }
    }
}

async fn forward_line(line: &str, ctx: &AppContext, handle: &SessionHandle) {
    let (key, command) = match parse_command_line(line) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(target: "sessionctl.cli", error = %e, "ignoring stdin line");
            return;
        }
    };
    let key = key.unwrap_or_else(|| handle.key().to_string());
    if let Err(e) = ctx.bus().send(&key, command).await {
        tracing::warn!(
            target: "sessionctl.cli",
            session_key = %key,
            error = %e,
            "command not delivered"
        );
    }
}

async fn graceful_stop(ctx: &AppContext) {
    ctx.manager().request_graceful_stop();
    let stats = ctx.manager().get_session_stats().await;
    tracing::info!(
        target: "sessionctl.cli",
        stage = "serve.interrupt",
        running = stats.running,
        starting = stats.starting,
        "interrupt received, sessions will stop at their next heartbeat"
    );
}

/// Keeps serving a session that is still running after stdin closed.
async fn wait_until_idle(ctx: &AppContext, handle: &SessionHandle) {
    let mut events = ctx.manager().subscribe();
    loop {
        match handle.status().await {
            Some(SessionStatus::Running) | Some(SessionStatus::Starting) => {}
            _ => return,
        }
        tokio::select! {
            ev = events.recv() => {
                if let Err(RecvError::Closed) = ev {
                    return;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                graceful_stop(ctx).await;
                return;
            }
        }
    }
}
