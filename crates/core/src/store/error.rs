//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur while writing to the task store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store client is missing configuration.
    #[error("Store not configured: {0}")]
    NotConfigured(String),

    /// Could not reach the store.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Store did not answer in time.
    #[error("Store request timed out")]
    Timeout,

    /// No record with this task_id (zero rows affected).
    #[error("Task not found: {0}")]
    NotFound(String),

    /// Store rejected the write.
    #[error("Store API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Store answered with something we could not read.
    #[error("Failed to parse store response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::Timeout
        } else if e.is_connect() {
            StoreError::Connection(e.to_string())
        } else if e.is_decode() {
            StoreError::Parse(e.to_string())
        } else {
            StoreError::Connection(e.to_string())
        }
    }
}
