// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::models::HealthAssessment;
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) status_tx: broadcast::Sender<HealthAssessment>,
    pub(crate) ws_status_connections: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

pub fn app(
    pipeline: Arc<Pipeline>,
    status_tx: broadcast::Sender<HealthAssessment>,
    ws_status_connections: Arc<AtomicUsize>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        pipeline,
        status_tx,
        ws_status_connections,
        config,
    };
    Router::new()
        .route("/", get(|| async { "netsentinel: network triage service" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/health", get(http::health_handler)) // GET /api/health
        .route("/api/monitor", get(http::monitor_handler)) // GET /api/monitor
        .route("/api/history", get(http::history_handler)) // GET /api/history?limit=N
        .route("/api/diagnose", post(http::diagnose_handler)) // POST /api/diagnose
        .route(
            "/api/diagnosis/latest",
            get(http::latest_diagnosis_handler),
        ) // GET /api/diagnosis/latest
        .route("/api/fix", post(http::fix_handler)) // POST /api/fix
        .route("/ws/status", get(ws::ws_status)) // WS /ws/status
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .with_state(state)
}
