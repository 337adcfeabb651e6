use std::sync::Arc;
use std::time::Instant;

use tokio_util::task::TaskTracker;
use vidfetch_core::{Config, DownloadOrchestrator, OrchestratorStatus, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<DownloadOrchestrator>,
    tasks: TaskTracker,
    started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<DownloadOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
            tasks: TaskTracker::new(),
            started_at: Instant::now(),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &Arc<DownloadOrchestrator> {
        &self.orchestrator
    }

    /// Download lifecycles spawned by the API. Drained on shutdown.
    pub fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    /// Whether the task store was initialized at startup.
    pub fn supabase_connected(&self) -> bool {
        self.orchestrator.store_connected()
    }

    pub fn orchestrator_status(&self) -> OrchestratorStatus {
        self.orchestrator.status()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
