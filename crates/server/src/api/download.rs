//! Download API handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use vidfetch_core::{DownloadRequest, DownloadTask, OrchestratorError, TaskStatus};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for a task that reached `completed`
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub message: String,
    pub task_id: String,
    pub status: TaskStatus,
    pub file_url: String,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Run a download task to completion.
///
/// The request is validated before anything is written. The lifecycle runs
/// in its own tracked tokio task, so neither a client that disconnects
/// mid-download nor a graceful shutdown leaves the record stuck in
/// `processing`.
pub async fn create_download(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected download request body: {}", rejection.body_text());
        error_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    })?;

    let task = DownloadTask::try_from(request).map_err(|e| {
        warn!("Invalid download request: {}", e);
        error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    info!("Received download request for task {}", task.task_id);

    let orchestrator = Arc::clone(state.orchestrator());
    let handle = state
        .tasks()
        .spawn(async move { orchestrator.create_download(task).await });

    let outcome = handle.await.map_err(|e| {
        error!("Download task aborted: {}", e);
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Download failed: {}", e),
        )
    })?;

    match outcome {
        Ok(completed) => Ok(Json(DownloadResponse {
            success: true,
            message: "Download task completed".to_string(),
            task_id: completed.task_id,
            status: completed.status,
            file_url: completed.file_url,
            timestamp: completed.completed_at,
        })),
        Err(e @ OrchestratorError::InFlight { .. }) => {
            Err(error_response(StatusCode::CONFLICT, e.to_string()))
        }
        Err(OrchestratorError::Retrieval { source, .. }) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Download failed: {}", source),
        )),
    }
}
