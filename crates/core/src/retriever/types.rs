//! Types for the retriever module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::task::{DownloadKind, DownloadTask};

/// What to retrieve and in which shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// Task this retrieval belongs to. Used to name the artifact.
    pub task_id: String,
    pub video_url: String,
    pub quality: String,
    pub format: String,
    pub download_type: DownloadKind,
    pub include_subtitles: bool,
}

impl From<&DownloadTask> for RetrievalRequest {
    fn from(task: &DownloadTask) -> Self {
        Self {
            task_id: task.task_id.clone(),
            video_url: task.video_url.clone(),
            quality: task.quality.clone(),
            format: task.format.clone(),
            download_type: task.download_type,
            include_subtitles: task.include_subtitles,
        }
    }
}

/// Result of a successful retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Locator the caller can use to reach the output.
    pub file_url: String,
    /// Local path of the output, when it lives on this host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Artifact {
    pub fn remote(file_url: impl Into<String>) -> Self {
        Self {
            file_url: file_url.into(),
            path: None,
        }
    }
}
