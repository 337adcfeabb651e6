//! Mock retriever for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::retriever::{Artifact, RetrievalError, RetrievalRequest, Retriever};

/// Base URL used for artifacts the mock produces by default.
pub const MOCK_STORAGE_BASE: &str = "https://storage.example.com/downloads";

/// Mock implementation of the Retriever trait.
///
/// Provides controllable behavior for testing:
/// - Track retrieval requests for assertions
/// - Simulate success/failure
/// - Simulate slow retrievals
///
/// # Example
///
/// ```rust,ignore
/// use vidfetch_core::testing::MockRetriever;
///
/// let retriever = MockRetriever::new();
/// retriever.set_next_error(RetrievalError::failed("unsupported codec")).await;
///
/// let result = retriever.retrieve(&request).await;
/// assert!(result.is_err());
/// assert_eq!(retriever.request_count().await, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockRetriever {
    /// Recorded requests.
    requests: Arc<RwLock<Vec<RetrievalRequest>>>,
    /// If set, the next retrieval will fail with this error.
    next_error: Arc<RwLock<Option<RetrievalError>>>,
    /// If set, every retrieval fails with this message.
    fail_all: Arc<RwLock<Option<String>>>,
    /// If set, successful retrievals return this locator.
    file_url: Arc<RwLock<Option<String>>>,
    /// Simulated retrieval duration.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockRetriever {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRetriever {
    /// Create a new mock retriever that succeeds immediately.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            fail_all: Arc::new(RwLock::new(None)),
            file_url: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded requests.
    pub async fn recorded_requests(&self) -> Vec<RetrievalRequest> {
        self.requests.read().await.clone()
    }

    /// Get the number of retrievals attempted.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Configure the next retrieval to fail with the given error.
    pub async fn set_next_error(&self, error: RetrievalError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every retrieval fail with the given message until cleared.
    pub async fn set_fail_all(&self, message: Option<&str>) {
        *self.fail_all.write().await = message.map(str::to_string);
    }

    /// Return this locator from successful retrievals.
    pub async fn set_file_url(&self, file_url: impl Into<String>) {
        *self.file_url.write().await = Some(file_url.into());
    }

    /// Set the simulated retrieval duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// The locator a successful retrieval of `request` returns by default.
    pub fn default_file_url(request: &RetrievalRequest) -> String {
        format!("{}/{}.{}", MOCK_STORAGE_BASE, request.task_id, request.format)
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    fn name(&self) -> &str {
        "mock"
    }

    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Artifact, RetrievalError> {
        self.requests.write().await.push(request.clone());

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if let Some(message) = self.fail_all.read().await.as_ref() {
            return Err(RetrievalError::failed(message.clone()));
        }

        let file_url = match self.file_url.read().await.as_ref() {
            Some(url) => url.clone(),
            None => Self::default_file_url(request),
        };
        Ok(Artifact::remote(file_url))
    }

    async fn validate(&self) -> Result<(), RetrievalError> {
        Ok(())
    }
}
