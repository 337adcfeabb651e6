//! Trait definitions for the retriever module.

use async_trait::async_trait;

use super::error::RetrievalError;
use super::types::{Artifact, RetrievalRequest};

/// A capability that fetches a remote media resource.
///
/// Retrieval is long-running; callers bound it with their own timeout.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns the name of this retriever implementation.
    fn name(&self) -> &str;

    /// Fetch the resource described by the request.
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Artifact, RetrievalError>;

    /// Validates that the retriever is properly configured and ready.
    async fn validate(&self) -> Result<(), RetrievalError>;
}
