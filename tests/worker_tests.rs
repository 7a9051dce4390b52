// Worker and pipeline cycles: tick, broadcast, diagnose on the transition into an unhealthy state, shutdown

mod common;

use common::*;
use netsentinel::models::Status;
use netsentinel::pipeline::Pipeline;
use netsentinel::worker::{WorkerConfig, WorkerDeps, should_diagnose, spawn};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tokio::time::Duration;

#[test]
fn test_should_diagnose_on_transition_only() {
    assert!(should_diagnose(None, Status::Degraded));
    assert!(should_diagnose(Some(Status::Healthy), Status::Unhealthy));
    assert!(!should_diagnose(None, Status::Healthy));
    assert!(!should_diagnose(Some(Status::Degraded), Status::Degraded));
    assert!(!should_diagnose(Some(Status::Degraded), Status::Unhealthy));
    assert!(!should_diagnose(Some(Status::Unhealthy), Status::Healthy));
}

async fn run_worker(pipeline: Arc<Pipeline>, ticks: u64) -> Vec<Status> {
    let (tx, mut rx) = broadcast::channel(16);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = spawn(
        WorkerDeps {
            pipeline,
            tx,
            ws_status_connections: Arc::new(AtomicUsize::new(0)),
            shutdown_rx,
        },
        WorkerConfig {
            check_interval_secs: 30,
            stats_log_interval_secs: 3600,
        },
    );

    let mut statuses = Vec::new();
    for _ in 0..ticks {
        let assessment = tokio::time::timeout(Duration::from_secs(120), rx.recv())
            .await
            .expect("tick within interval")
            .expect("broadcast open");
        statuses.push(assessment.status);
    }
    let _ = shutdown_tx.send(());
    handle.await.unwrap();
    statuses
}

#[tokio::test(start_paused = true)]
async fn test_worker_diagnoses_once_per_degradation() {
    // 250ms to public targets: degraded on every tick.
    let pipeline = Arc::new(Pipeline::new(
        &test_app_config(),
        Arc::new(healthy_network(3.0, 250.0, -55)),
        None,
    ));
    let statuses = run_worker(pipeline.clone(), 3).await;

    assert_eq!(statuses, vec![Status::Degraded; 3]);
    let stats = pipeline.stats();
    assert!(stats.checks_run >= 3);
    assert_eq!(stats.diagnoses_run, 1);
    let diagnosis = pipeline.latest_diagnosis().await.expect("diagnosed");
    assert_eq!(diagnosis.alert_status, Status::Degraded);
    assert!(diagnosis.network_health_score.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_worker_skips_diagnosis_while_healthy() {
    let pipeline = Arc::new(Pipeline::new(
        &test_app_config(),
        Arc::new(healthy_network(3.0, 20.0, -55)),
        None,
    ));
    let statuses = run_worker(pipeline.clone(), 2).await;

    assert_eq!(statuses, vec![Status::Healthy; 2]);
    assert_eq!(pipeline.stats().diagnoses_run, 0);
    assert!(pipeline.latest_diagnosis().await.is_none());
}

#[tokio::test]
async fn test_run_cycle_diagnoses_only_when_unhealthy() {
    let healthy = Pipeline::new(
        &test_app_config(),
        Arc::new(healthy_network(3.0, 20.0, -55)),
        None,
    );
    let outcome = healthy.run_cycle().await;
    assert_eq!(outcome.assessment.status, Status::Healthy);
    assert!(outcome.diagnosis.is_none());

    let slow = Pipeline::new(
        &test_app_config(),
        Arc::new(healthy_network(3.0, 250.0, -55)),
        None,
    );
    let outcome = slow.run_cycle().await;
    assert_eq!(outcome.assessment.status, Status::Degraded);
    let diagnosis = outcome.diagnosis.expect("degraded cycle diagnoses");
    assert_eq!(
        diagnosis.primary_issue,
        netsentinel::models::PrimaryIssue::HighExternalLatency
    );
    assert_eq!(diagnosis.network_health_score, Some(80));
    assert_eq!(slow.stats().diagnoses_run, 1);
}
