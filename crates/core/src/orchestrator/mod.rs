//! Download orchestrator.
//!
//! The orchestrator owns the task lifecycle state machine:
//! - **Processing**: entered as soon as a request is accepted
//! - **Completed**: retrieval produced an artifact reference (terminal)
//! - **Failed**: retrieval raised an error (terminal)
//!
//! Each call handles one task synchronously; callers run calls concurrently.

mod config;
mod runner;
mod types;

pub use config::{DuplicatePolicy, OrchestratorConfig};
pub use runner::DownloadOrchestrator;
pub use types::{CompletedDownload, OrchestratorError, OrchestratorStatus};
