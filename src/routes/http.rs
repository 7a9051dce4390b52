// HTTP handlers: version, health, monitor, history, diagnose, fix

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use super::AppState;
use crate::solutions::{DiagnosisSummary, SolutionReport};

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(super) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.pipeline.stats();
    Json(serde_json::json!({
        "status": "running",
        "interface": state.pipeline.interface(),
        "checks_run": stats.checks_run,
        "diagnoses_run": stats.diagnoses_run,
        "ws_status_clients": state
            .ws_status_connections
            .load(std::sync::atomic::Ordering::Relaxed),
        "timestamp": chrono::Utc::now(),
    }))
}

/// GET /api/monitor: run one check now.
pub(super) async fn monitor_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.pipeline.check_once().await)
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    limit: Option<usize>,
}

/// GET /api/history?limit=N: most recent snapshots, oldest first.
pub(super) async fn history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query
        .limit
        .unwrap_or(state.config.monitoring.history_capacity);
    Json(state.pipeline.history(limit).await)
}

/// POST /api/diagnose: check, then triage regardless of status, then solutions.
pub(super) async fn diagnose_handler(State(state): State<AppState>) -> impl IntoResponse {
    let assessment = state.pipeline.check_once().await;
    let diagnosis = state.pipeline.diagnose(&assessment).await;
    let solutions = SolutionReport::from_diagnosis(&diagnosis);
    Json(serde_json::json!({
        "assessment": assessment,
        "diagnosis": diagnosis,
        "solutions": solutions,
    }))
}

/// GET /api/diagnosis/latest: 404 until a diagnosis has run.
pub(super) async fn latest_diagnosis_handler(
    State(state): State<AppState>,
) -> axum::response::Response {
    match state.pipeline.latest_diagnosis().await {
        Some(diagnosis) => Json(diagnosis).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "no diagnosis has run yet" })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FixRequest {
    #[serde(alias = "diagnostic")]
    diagnosis: DiagnosisSummary,
}

/// POST /api/fix: solution report for a posted diagnosis.
pub(super) async fn fix_handler(Json(request): Json<FixRequest>) -> impl IntoResponse {
    Json(SolutionReport::from_summary(&request.diagnosis))
}
