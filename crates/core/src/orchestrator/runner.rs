//! Download orchestrator implementation.
//!
//! Runs one task through its lifecycle per call:
//! processing -> (retrieval) -> completed | failed
//!
//! Store writes are a side channel. A failed write is logged and counted but
//! never changes what the caller gets back.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::metrics::{
    RETRIEVAL_DURATION, STORE_WRITES, TASKS_COMPLETED, TASKS_FAILED, TASKS_REJECTED,
    TASKS_STARTED,
};
use crate::retriever::{Artifact, RetrievalError, RetrievalRequest, Retriever};
use crate::store::TaskStore;
use crate::task::{DownloadTask, TaskStatus, TaskTransition};

use super::config::{DuplicatePolicy, OrchestratorConfig};
use super::types::{CompletedDownload, OrchestratorError, OrchestratorStatus};

/// Set of task ids currently being processed by this process.
#[derive(Default)]
struct InFlight {
    tasks: Mutex<HashSet<String>>,
}

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim a task id. Returns None if it is already claimed.
    fn claim(self: &Arc<Self>, task_id: &str) -> Option<InFlightGuard> {
        if !self.lock().insert(task_id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            registry: Arc::clone(self),
            task_id: task_id.to_string(),
        })
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Releases a claimed task id when dropped.
struct InFlightGuard {
    registry: Arc<InFlight>,
    task_id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.task_id);
    }
}

/// The download orchestrator - drives a task from processing to a terminal state.
pub struct DownloadOrchestrator {
    config: OrchestratorConfig,
    store: Option<Arc<dyn TaskStore>>,
    retriever: Arc<dyn Retriever>,
    in_flight: Arc<InFlight>,
}

impl DownloadOrchestrator {
    /// Create a new orchestrator.
    ///
    /// `store` is `None` when the task store could not be initialized; the
    /// orchestrator then skips every write and only reports retrieval results.
    pub fn new(
        config: OrchestratorConfig,
        store: Option<Arc<dyn TaskStore>>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        if store.is_none() {
            warn!("Orchestrator running without a task store; status updates will be skipped");
        }

        Self {
            config,
            store,
            retriever,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Whether a task store is attached.
    pub fn store_connected(&self) -> bool {
        self.store.is_some()
    }

    /// Get current orchestrator status.
    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            store_connected: self.store_connected(),
            retriever: self.retriever.name().to_string(),
            in_flight: self.in_flight.len(),
        }
    }

    /// Run a validated task through its lifecycle.
    ///
    /// Steps run strictly in order: write `processing`, retrieve, write the
    /// terminal status, return. Exactly one terminal write is attempted for
    /// every task that gets past the duplicate check.
    pub async fn create_download(
        &self,
        task: DownloadTask,
    ) -> Result<CompletedDownload, OrchestratorError> {
        let _guard = match self.config.duplicate_policy {
            DuplicatePolicy::Reject => match self.in_flight.claim(&task.task_id) {
                Some(guard) => Some(guard),
                None => {
                    warn!("Rejecting task {}: already in flight", task.task_id);
                    TASKS_REJECTED.inc();
                    return Err(OrchestratorError::InFlight {
                        task_id: task.task_id,
                    });
                }
            },
            DuplicatePolicy::LastWriteWins => None,
        };

        info!(
            "Starting task {} (url: {}, quality: {}, format: {}, type: {})",
            task.task_id, task.video_url, task.quality, task.format, task.download_type
        );
        TASKS_STARTED.inc();

        self.record(&task.task_id, TaskTransition::Processing).await;

        let start = Instant::now();
        let outcome = self.retrieve(&task).await;
        let elapsed = start.elapsed().as_secs_f64();

        match outcome {
            Ok(artifact) => {
                RETRIEVAL_DURATION
                    .with_label_values(&["success"])
                    .observe(elapsed);

                let completed_at = self
                    .record(
                        &task.task_id,
                        TaskTransition::Completed {
                            file_url: artifact.file_url.clone(),
                        },
                    )
                    .await;
                TASKS_COMPLETED.inc();

                info!(
                    "Task {} completed in {:.1}s: {}",
                    task.task_id, elapsed, artifact.file_url
                );

                Ok(CompletedDownload {
                    task_id: task.task_id,
                    status: TaskStatus::Completed,
                    file_url: artifact.file_url,
                    completed_at,
                })
            }
            Err(e) => {
                RETRIEVAL_DURATION
                    .with_label_values(&["failed"])
                    .observe(elapsed);

                let e = self.with_message(e);
                error!("Task {} failed after {:.1}s: {}", task.task_id, elapsed, e);

                self.record(
                    &task.task_id,
                    TaskTransition::Failed {
                        error_message: e.to_string(),
                    },
                )
                .await;
                TASKS_FAILED.inc();

                Err(OrchestratorError::Retrieval {
                    task_id: task.task_id,
                    source: e,
                })
            }
        }
    }

    /// Run the retrieval under the configured time bound.
    async fn retrieve(&self, task: &DownloadTask) -> Result<Artifact, RetrievalError> {
        let request = RetrievalRequest::from(task);
        let timeout_secs = self.config.retrieval_timeout_secs;

        let attempt = AssertUnwindSafe(self.retriever.retrieve(&request)).catch_unwind();

        let artifact = match tokio::time::timeout(Duration::from_secs(timeout_secs), attempt).await
        {
            Ok(Ok(result)) => result?,
            Ok(Err(_)) => {
                return Err(RetrievalError::failed(format!(
                    "{} retriever panicked",
                    self.retriever.name()
                )))
            }
            Err(_) => return Err(RetrievalError::Timeout { timeout_secs }),
        };

        if artifact.file_url.trim().is_empty() {
            return Err(RetrievalError::failed(format!(
                "{} returned an empty artifact reference",
                self.retriever.name()
            )));
        }

        Ok(artifact)
    }

    /// Replace an error whose message is blank, so `failed` records always
    /// carry a readable `error_message`.
    fn with_message(&self, e: RetrievalError) -> RetrievalError {
        if e.to_string().trim().is_empty() {
            RetrievalError::failed(format!(
                "{} failed without a message",
                self.retriever.name()
            ))
        } else {
            e
        }
    }

    /// Write a transition to the store, best-effort.
    ///
    /// Returns the timestamp used for the update.
    async fn record(&self, task_id: &str, transition: TaskTransition) -> chrono::DateTime<Utc> {
        let now = Utc::now();
        let status = transition.status();

        let Some(store) = &self.store else {
            debug!(
                "No task store; skipping {} update for task {}",
                status, task_id
            );
            STORE_WRITES
                .with_label_values(&[status.as_str(), "skipped"])
                .inc();
            return now;
        };

        let update = transition.to_update(now);
        match store.update(task_id, &update).await {
            Ok(()) => {
                debug!("Stored {} for task {}", status, task_id);
                STORE_WRITES.with_label_values(&[status.as_str(), "ok"]).inc();
            }
            Err(e) => {
                warn!(
                    "Failed to store {} status for task {}: {}",
                    status, task_id, e
                );
                STORE_WRITES
                    .with_label_values(&[status.as_str(), "error"])
                    .inc();
            }
        }

        now
    }
}
