//! Trait definitions for the store module.

use async_trait::async_trait;

use super::error::StoreError;
use crate::task::TaskUpdate;

/// A remote record store holding task status, keyed by task_id.
///
/// Implementations are shared across concurrent requests.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns the name of this store implementation.
    fn name(&self) -> &str;

    /// Apply a partial-field update to the record for `task_id`.
    ///
    /// Fails with [`StoreError::NotFound`] when no record matched.
    async fn update(&self, task_id: &str, update: &TaskUpdate) -> Result<(), StoreError>;
}
