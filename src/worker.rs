// Background monitor: check on every tick, broadcast the assessment, and run triage
// when the network stops being healthy.

use crate::models::{HealthAssessment, Status};
use crate::pipeline::Pipeline;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Rate limit for the "no receivers" message (avoid logging every tick when no one is on /ws/status)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Pipeline, channels, and shutdown for the worker.
pub struct WorkerDeps {
    pub pipeline: Arc<Pipeline>,
    pub tx: broadcast::Sender<HealthAssessment>,
    pub ws_status_connections: Arc<AtomicUsize>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub check_interval_secs: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Diagnosis runs on the edge into a non-healthy status, not on every bad tick.
/// The first check counts as coming from healthy.
pub fn should_diagnose(previous: Option<Status>, current: Status) -> bool {
    current != Status::Healthy && previous.is_none_or(|p| p == Status::Healthy)
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        pipeline,
        tx,
        ws_status_connections,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        check_interval_secs,
        stats_log_interval_secs,
    } = config;

    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "worker",
        check_interval_secs,
        interface = pipeline.interface()
    );

    let task = async move {
        let mut tick = interval(Duration::from_secs(check_interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut previous: Option<Status> = None;
        let mut last_no_receivers_warn: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let assessment = pipeline.check_once().await;
                    let status = assessment.status;

                    if previous.is_some_and(|p| p != status) {
                        tracing::info!(
                            from = previous.map(Status::as_str).unwrap_or("none"),
                            to = %status,
                            issues = assessment.issues.len(),
                            warnings = assessment.warnings.len(),
                            "network status changed"
                        );
                    }

                    if tx.send(assessment.clone()).is_err() {
                        let should_warn = last_no_receivers_warn
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                        if should_warn {
                            tracing::debug!(
                                operation = "broadcast_assessment",
                                "No active WebSocket clients; broadcast channel has no receivers"
                            );
                            last_no_receivers_warn = Some(Instant::now());
                        }
                    }

                    if should_diagnose(previous, status) {
                        pipeline.diagnose(&assessment).await;
                    }
                    previous = Some(status);
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    let stats = pipeline.stats();
                    tracing::info!(
                        ws_status_clients =
                            ws_status_connections.load(std::sync::atomic::Ordering::Relaxed),
                        checks_run = stats.checks_run,
                        diagnoses_run = stats.diagnoses_run,
                        "app stats"
                    );
                }
            }
        }
    };
    tokio::spawn(task.instrument(worker_span))
}
