//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// What to do when a request arrives for a task that is already running.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Refuse the second request while the first is in flight.
    #[default]
    Reject,
    /// Run both; the store keeps whichever terminal write lands last.
    LastWriteWins,
}

/// Configuration for the download orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Upper bound on a single retrieval, in seconds.
    /// A retrieval that runs longer fails the task with a timeout error.
    #[serde(default = "default_retrieval_timeout")]
    pub retrieval_timeout_secs: u64,

    /// Policy for concurrent requests sharing a task_id.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
}

fn default_retrieval_timeout() -> u64 {
    1800 // 30 minutes
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retrieval_timeout_secs: default_retrieval_timeout(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}
