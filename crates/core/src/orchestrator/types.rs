//! Orchestrator types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::retriever::RetrievalError;
use crate::task::TaskStatus;

/// Result of a task that reached `completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedDownload {
    pub task_id: String,
    pub status: TaskStatus,
    pub file_url: String,
    pub completed_at: DateTime<Utc>,
}

/// Why a download request did not produce an artifact.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Another request for the same task_id is still running.
    #[error("Task {task_id} is already being processed")]
    InFlight { task_id: String },

    /// Retrieval failed and the task was moved to `failed`.
    #[error("{source}")]
    Retrieval {
        task_id: String,
        #[source]
        source: RetrievalError,
    },
}

impl OrchestratorError {
    pub fn task_id(&self) -> &str {
        match self {
            OrchestratorError::InFlight { task_id } => task_id,
            OrchestratorError::Retrieval { task_id, .. } => task_id,
        }
    }
}

/// Snapshot of orchestrator activity.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    /// Whether a task store is attached (false in degraded mode).
    pub store_connected: bool,
    /// Name of the retriever in use.
    pub retriever: String,
    /// Task ids currently between `processing` and a terminal state.
    pub in_flight: usize,
}
