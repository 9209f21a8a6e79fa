//! Execution engine that trades nothing: it beats once per wait interval so
//! the UI sees a live session, until the session is asked to stop.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

use sessionctl_core::api::{ExecutionEngine, SessionRun, SessionType};

#[derive(Default)]
pub struct DryRunEngine {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl DryRunEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_sessions(&self) -> usize {
        self.tasks
            .lock()
            .map(|tasks| tasks.values().filter(|t| !t.is_finished()).count())
            .unwrap_or(0)
    }
}

/// Simulated clock: backtests walk their window one time frame at a time,
/// everything else reports wall-clock time.
enum Clock {
    Wall,
    Replay {
        next_ms: Option<i64>,
        step_ms: i64,
        end_ms: i64,
    },
}

impl Clock {
    fn for_run(run: &SessionRun) -> Self {
        let params = &run.session.parameters;
        match run.session.session_type {
            SessionType::Backtesting => {
                let step_ms = params
                    .time_frame
                    .config
                    .value
                    .unwrap_or_else(|| run.wait_time_ms());
                Self::Replay {
                    next_ms: Some(params.time_range.config.initial_datetime),
                    step_ms: i64::try_from(step_ms).unwrap_or(i64::MAX).max(1),
                    end_ms: params.time_range.config.final_datetime,
                }
            }
            _ => Self::Wall,
        }
    }

    /// Next processing date, or `None` once the window is exhausted.
    fn tick(&mut self) -> Option<DateTime<Utc>> {
        match self {
            Self::Wall => Some(Utc::now()),
            Self::Replay {
                next_ms,
                step_ms,
                end_ms,
            } => {
                let ms = (*next_ms).filter(|ms| *ms <= *end_ms)?;
                *next_ms = ms.checked_add(*step_ms);
                Utc.timestamp_millis_opt(ms).single()
            }
        }
    }
}

async fn drive(run: SessionRun) {
    let reporter = run.reporter.clone();
    let interval = Duration::from_millis(run.wait_time_ms().max(1));
    let mut clock = Clock::for_run(&run);
    let mut cycles: u64 = 0;

    while !reporter.stop_requested().await {
        let Some(processing_date) = clock.tick() else {
            tracing::info!(
                target: "sessionctl.engine",
                stage = "engine.dry_run.done",
                session_key = reporter.session_key(),
                cycles,
                "backtest window exhausted"
            );
            if let Err(e) = reporter.request_stop().await {
                tracing::warn!(
                    target: "sessionctl.engine",
                    session_key = reporter.session_key(),
                    error = %e,
                    "stop request failed"
                );
            }
            break;
        };
        reporter.heartbeat(processing_date).await;
        cycles += 1;
        tokio::time::sleep(interval).await;
    }
    tracing::debug!(
        target: "sessionctl.engine",
        session_key = reporter.session_key(),
        cycles,
        "dry run loop ended"
    );
}

#[async_trait]
impl ExecutionEngine for DryRunEngine {
    fn name(&self) -> &str {
        "dry_run"
    }

    async fn run(&self, run: SessionRun) -> bool {
        let key = run.session.session_key.clone();
        tracing::info!(
            target: "sessionctl.engine",
            stage = "engine.dry_run.start",
            session_key = %key,
            run_id = %run.run_id,
            wait_time_ms = run.wait_time_ms(),
            resume = run.resume,
            "dry run started"
        );
        let handle = tokio::spawn(drive(run));
        match self.tasks.lock() {
            Ok(mut tasks) => {
                if let Some(previous) = tasks.insert(key, handle) {
                    previous.abort();
                }
                true
            }
            Err(_) => {
                handle.abort();
                false
            }
        }
    }

    async fn finalize(&self, session_key: &str) {
        let handle = self
            .tasks
            .lock()
            .ok()
            .and_then(|mut tasks| tasks.remove(session_key));
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}
