use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resume text is empty")]
    EmptyInput,

    #[error("Analysis already running for session {0}")]
    AnalysisInProgress(Uuid),

    #[error("Remote analysis is not configured")]
    RemoteUnavailable,

    /// Retries exhausted on 429 / 5xx / transport failures.
    #[error("Remote call failed after {attempts} attempts: {message}")]
    RemoteCall {
        attempts: u32,
        last_status: Option<u16>,
        message: String,
    },

    #[error("Remote request rejected (status {status}): {message}")]
    RemoteRequestRejected { status: u16, message: String },

    #[error("Malformed remote response: {0}")]
    ResponseShape(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::RemoteCall {
                attempts,
                last_status,
                last_failure,
            } => AppError::RemoteCall {
                attempts,
                last_status,
                message: last_failure,
            },
            LlmError::RequestRejected { status, message } => {
                AppError::RemoteRequestRejected { status, message }
            }
            LlmError::ResponseShape(msg) => AppError::ResponseShape(msg),
            LlmError::Encode(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::EmptyInput => (
                StatusCode::BAD_REQUEST,
                "EMPTY_INPUT",
                "Please paste your resume text first.".to_string(),
            ),
            AppError::AnalysisInProgress(session_id) => (
                StatusCode::CONFLICT,
                "ANALYSIS_IN_PROGRESS",
                format!("An analysis is already running for session {session_id}"),
            ),
            AppError::RemoteUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "REMOTE_UNAVAILABLE",
                "Remote analysis is not configured on this server".to_string(),
            ),
            AppError::RemoteCall {
                attempts,
                last_status,
                message,
            } => {
                tracing::error!(
                    "Remote call failed after {attempts} attempts (last status {last_status:?}): {message}"
                );
                let status_text = last_status
                    .map(|s| format!("last status {s}"))
                    .unwrap_or_else(|| "network failure".to_string());
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "REMOTE_CALL_FAILED",
                    format!("The analysis service is unavailable ({status_text}). Please try again later."),
                )
            }
            AppError::RemoteRequestRejected { status, message } => {
                tracing::error!("Remote request rejected with {status}: {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "REMOTE_REQUEST_REJECTED",
                    format!("The analysis service rejected the request (status {status})"),
                )
            }
            AppError::ResponseShape(msg) => {
                tracing::error!("Malformed remote response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "RESPONSE_SHAPE_ERROR",
                    "The analysis service returned an unexpected response".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
