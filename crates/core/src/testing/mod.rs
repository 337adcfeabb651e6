//! Testing utilities and mock implementations.
//!
//! Mocks for the retriever and task store seams, so the orchestrator and the
//! HTTP layer can be exercised without yt-dlp or a Supabase project.
//!
//! # Example
//!
//! ```rust,ignore
//! use vidfetch_core::testing::{MockRetriever, MockTaskStore};
//!
//! let retriever = Arc::new(MockRetriever::new());
//! let store = Arc::new(MockTaskStore::new());
//!
//! let orchestrator = DownloadOrchestrator::new(
//!     OrchestratorConfig::default(),
//!     Some(store.clone()),
//!     retriever.clone(),
//! );
//! ```

mod mock_retriever;
mod mock_store;

pub use mock_retriever::{MockRetriever, MOCK_STORAGE_BASE};
pub use mock_store::{MockTaskStore, RecordedUpdate};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::task::{DownloadRequest, DownloadTask};

    pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    /// A validated video task with default quality and format.
    pub fn download_task(task_id: &str) -> DownloadTask {
        DownloadTask::new(task_id, VIDEO_URL).expect("fixture task is valid")
    }

    /// A raw request body with only the required fields.
    pub fn download_request(task_id: &str) -> DownloadRequest {
        DownloadRequest {
            task_id: Some(task_id.to_string()),
            video_url: Some(VIDEO_URL.to_string()),
            ..Default::default()
        }
    }
}
