//! HTTP form service for the checklist review.
//!
//! ```text
//! GET  /                              form page
//! GET  /health                        liveness
//! POST /api/analyses                  multipart: api_key, file1, file2 → 202 {job_id}
//! GET  /api/analyses/{id}             status, history, error, results
//! GET  /api/analyses/{id}/report      rendered report (inline)
//! GET  /api/analyses/{id}/download    rendered report (attachment)
//! ```
//!
//! Each submission runs in its own task with its own job record; runs never
//! read or write each other's state.

mod handlers;
pub mod jobs;
mod page;

use crate::analyze::Orchestrator;
use crate::config::ServerConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{ApiError, CreatedResponse, HealthResponse, DOWNLOAD_FILENAME};
pub use jobs::{JobError, JobProgress, JobSnapshot, JobState, JobStore};

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Template for every run; each job gets a copy with its own callback.
    pub orchestrator: Orchestrator,
    pub jobs: JobStore,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, config: ServerConfig) -> Self {
        Self {
            orchestrator,
            jobs: JobStore::new(),
            config,
        }
    }
}

/// Build the router with all endpoints
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/api/analyses", post(handlers::create_analysis))
        .route("/api/analyses/{job_id}", get(handlers::get_analysis))
        .route("/api/analyses/{job_id}/report", get(handlers::get_report))
        .route("/api/analyses/{job_id}/download", get(handlers::download_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.socket_addr();
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
