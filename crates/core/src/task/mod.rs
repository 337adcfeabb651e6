//! Download task model and lifecycle transitions.

mod types;

use thiserror::Error;

pub use types::{
    DownloadKind, DownloadRequest, DownloadTask, TaskStatus, TaskTransition, TaskUpdate,
    DEFAULT_FORMAT, DEFAULT_QUALITY, MAX_TASK_ID_LEN,
};

/// A download request that cannot enter the lifecycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
