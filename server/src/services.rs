pub mod health;
pub mod jobservice;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use joblib::Orchestrator;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Headroom on top of the asset limit for multipart boundaries and part headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub const ENDPOINTS: [&str; 5] = [
    "/api/upload",
    "/api/process",
    "/api/status/:jobId",
    "/api/jobs",
    "/api/download/:filename",
];

/// Build the HTTP application around `orchestrator`.
pub fn router(orchestrator: Orchestrator) -> Router {
    let body_limit = orchestrator.store().max_bytes() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(health::root))
        .route("/api", get(health::index))
        .route("/api/upload", post(jobservice::upload))
        .route("/api/process", post(jobservice::process))
        .route("/api/status/{job_id}", get(jobservice::status))
        .route("/api/jobs", get(jobservice::jobs))
        .route("/api/download/{filename}", get(jobservice::download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(orchestrator)
}
