pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::errors::AppError;
use crate::state::AppState;

/// Uploaded resumes (PDFs included) may be larger than Axum's 2 MB default.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

async fn not_found() -> Result<(), AppError> {
    Err(AppError::NotFound("no such route".to_string()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyses", post(handlers::handle_analyze))
        .route(
            "/api/v1/analyses/upload",
            post(handlers::handle_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/analyses/:session_id/status",
            get(handlers::handle_status),
        )
        .route("/api/v1/catalog", get(handlers::handle_catalog))
        .route("/api/v1/sample-resume", get(handlers::handle_sample_resume))
        .fallback(not_found)
        .with_state(state)
}
