//! Mock task store for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::store::{StoreError, TaskStore};
use crate::task::{TaskStatus, TaskUpdate};

/// A recorded store write for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedUpdate {
    pub task_id: String,
    pub update: TaskUpdate,
    /// Whether the write was accepted.
    pub success: bool,
}

/// Mock implementation of the TaskStore trait.
///
/// Every write is recorded, including rejected ones, so tests can check both
/// what the orchestrator attempted and what the store ended up holding.
#[derive(Debug, Clone, Default)]
pub struct MockTaskStore {
    updates: Arc<RwLock<Vec<RecordedUpdate>>>,
    /// When set, every write fails as if the store were unreachable.
    unavailable: Arc<RwLock<bool>>,
    /// Task ids the store has no record for.
    unknown: Arc<RwLock<HashSet<String>>>,
}

impl MockTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded writes, in order.
    pub async fn recorded_updates(&self) -> Vec<RecordedUpdate> {
        self.updates.read().await.clone()
    }

    /// Writes attempted for a single task, in order.
    pub async fn updates_for(&self, task_id: &str) -> Vec<TaskUpdate> {
        self.updates
            .read()
            .await
            .iter()
            .filter(|r| r.task_id == task_id)
            .map(|r| r.update.clone())
            .collect()
    }

    /// Latest accepted write for a task, i.e. what the record holds now.
    pub async fn last_update(&self, task_id: &str) -> Option<TaskUpdate> {
        self.updates
            .read()
            .await
            .iter()
            .rev()
            .find(|r| r.task_id == task_id && r.success)
            .map(|r| r.update.clone())
    }

    /// Count writes for a task that set a terminal status.
    pub async fn terminal_write_count(&self, task_id: &str) -> usize {
        self.updates_for(task_id)
            .await
            .iter()
            .filter(|u| u.status.is_terminal())
            .count()
    }

    /// Simulate the store being unreachable.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Simulate a task id with no record in the store.
    pub async fn add_unknown(&self, task_id: &str) {
        self.unknown.write().await.insert(task_id.to_string());
    }

    /// Current status of a task, as the store sees it.
    pub async fn status_of(&self, task_id: &str) -> Option<TaskStatus> {
        self.last_update(task_id).await.map(|u| u.status)
    }
}

#[async_trait]
impl TaskStore for MockTaskStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn update(&self, task_id: &str, update: &TaskUpdate) -> Result<(), StoreError> {
        let result = if *self.unavailable.read().await {
            Err(StoreError::Connection("mock store unavailable".to_string()))
        } else if self.unknown.read().await.contains(task_id) {
            Err(StoreError::NotFound(task_id.to_string()))
        } else {
            Ok(())
        };

        self.updates.write().await.push(RecordedUpdate {
            task_id: task_id.to_string(),
            update: update.clone(),
            success: result.is_ok(),
        });

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskTransition;
    use chrono::Utc;

    #[tokio::test]
    async fn test_records_writes() {
        let store = MockTaskStore::new();
        store
            .update("t1", &TaskTransition::Processing.to_update(Utc::now()))
            .await
            .unwrap();

        assert_eq!(store.status_of("t1").await, Some(TaskStatus::Processing));
        assert_eq!(store.updates_for("t1").await.len(), 1);
        assert!(store.updates_for("t2").await.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_records_failed_write() {
        let store = MockTaskStore::new();
        store.set_unavailable(true).await;

        let result = store
            .update("t1", &TaskTransition::Processing.to_update(Utc::now()))
            .await;

        assert!(matches!(result, Err(StoreError::Connection(_))));
        assert_eq!(store.updates_for("t1").await.len(), 1);
        assert_eq!(store.last_update("t1").await, None);
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let store = MockTaskStore::new();
        store.add_unknown("ghost").await;

        let result = store
            .update("ghost", &TaskTransition::Processing.to_update(Utc::now()))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
