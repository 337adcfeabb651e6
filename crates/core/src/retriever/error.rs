//! Error types for the retriever module.

use std::path::PathBuf;
use thiserror::Error;

use crate::task::DownloadKind;

/// Errors that can occur while retrieving a remote resource.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Retrieval failed; the message is reported verbatim.
    #[error("{0}")]
    Failed(String),

    /// Requested output format is not supported for this media kind.
    #[error("Unsupported {kind} format: {format}")]
    UnsupportedFormat { format: String, kind: DownloadKind },

    /// Retrieval tool binary not found.
    #[error("Retrieval tool not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// Retrieval ran past the configured bound.
    #[error("Retrieval timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while running the retrieval.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RetrievalError {
    /// Creates a new failed error with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
