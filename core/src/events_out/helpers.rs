use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::bus::{OutboundEvent, SessionBus};
use crate::state::{SessionManager, StateEvent};

use super::writer::EventsOutTx;

#[derive(Serialize)]
struct AuditLine<'a, T: Serialize> {
    ts: String,
    source: &'static str,
    #[serde(flatten)]
    body: &'a T,
}

pub async fn write_outbound_event(out: Option<&EventsOutTx>, ev: &OutboundEvent) {
    write_line(out, "bus", ev).await;
}

pub async fn write_state_event(out: Option<&EventsOutTx>, ev: &StateEvent) {
    write_line(out, "state", ev).await;
}

async fn write_line<T: Serialize>(out: Option<&EventsOutTx>, source: &'static str, body: &T) {
    let Some(out) = out else {
        return;
    };
    out.send_json(&AuditLine {
        ts: Utc::now().to_rfc3339(),
        source,
        body,
    })
    .await;
}

/// Mirrors every bus notification and state event into events_out until
/// both streams close.
pub fn spawn_mirror(out: EventsOutTx, bus: &SessionBus, manager: &SessionManager) -> JoinHandle<()> {
    let mut notifications = bus.notifications();
    let mut states = manager.subscribe();

    tokio::spawn(async move {
        let mut bus_open = true;
        let mut state_open = true;
        while bus_open || state_open {
            tokio::select! {
                ev = notifications.recv(), if bus_open => match ev {
                    Ok(ev) => write_outbound_event(Some(&out), &ev).await,
                    Err(RecvError::Lagged(n)) => lagged("bus", n),
                    Err(RecvError::Closed) => bus_open = false,
                },
                ev = states.recv(), if state_open => match ev {
                    Ok(ev) => write_state_event(Some(&out), &ev).await,
                    Err(RecvError::Lagged(n)) => lagged("state", n),
                    Err(RecvError::Closed) => state_open = false,
                },
            }
        }
    })
}

fn lagged(source: &'static str, skipped: u64) {
    tracing::warn!(
        target: "sessionctl.events_out",
        source,
        skipped,
        "events_out mirror lagged"
    );
}
