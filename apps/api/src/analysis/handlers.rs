//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::models::{Backend, Report};
use crate::analysis::session::{run_analysis, AnalysisState};
use crate::analysis::upload::{extract_resume_text, ResumeUpload};
use crate::errors::AppError;
use crate::scoring::catalog::{Catalog, SAMPLE_RESUME};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    #[serde(default)]
    pub backend: Backend,
    /// Reuse to serialize runs from one client; omitted → a fresh session.
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub session_id: Uuid,
    pub report: Report,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub state: AnalysisState,
}

#[derive(Debug, Serialize)]
pub struct SampleResumeResponse {
    pub resume_text: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyses
///
/// Analyzes pasted resume text with the requested backend (local by default).
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    analyze(&state, request.backend, request.session_id, &request.resume_text).await
}

/// POST /api/v1/analyses/upload
///
/// Multipart form: `file` (PDF or plain text), optional `backend` and `session_id`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut upload: Option<ResumeUpload> = None;
    let mut backend = Backend::default();
    let mut session_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
                upload = Some(ResumeUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            Some("backend") => {
                backend = read_text(field).await?.parse()?;
            }
            Some("session_id") => {
                let raw = read_text(field).await?;
                session_id = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| AppError::Validation(format!("invalid session_id '{raw}'")))?,
                );
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;
    let resume_text = extract_resume_text(upload).await?;

    analyze(&state, backend, session_id, &resume_text).await
}

/// GET /api/v1/analyses/:session_id/status
pub async fn handle_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse {
        session_id,
        state: state.sessions.state(session_id),
    })
}

/// GET /api/v1/catalog
pub async fn handle_catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}

/// GET /api/v1/sample-resume
pub async fn handle_sample_resume() -> Json<SampleResumeResponse> {
    Json(SampleResumeResponse {
        resume_text: SAMPLE_RESUME,
    })
}

async fn analyze(
    state: &AppState,
    backend: Backend,
    session_id: Option<Uuid>,
    resume_text: &str,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let analyzer = state.analyzers.select(backend)?;
    let session_id = session_id.unwrap_or_else(Uuid::new_v4);

    let report = run_analysis(&state.sessions, analyzer.as_ref(), session_id, resume_text).await?;
    info!("Session {session_id} finished ({:?} backend)", report.backend());

    Ok(Json(AnalyzeResponse { session_id, report }))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("invalid form field: {e}")))
}
