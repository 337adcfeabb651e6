//! Core download task data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Default quality tier when the caller does not ask for one.
pub const DEFAULT_QUALITY: &str = "1080p";

/// Default output container when the caller does not ask for one.
pub const DEFAULT_FORMAT: &str = "mp4";

/// Longest accepted task identifier.
pub const MAX_TASK_ID_LEN: usize = 128;

// ============================================================================
// Status
// ============================================================================

/// Lifecycle status of a download task as recorded in the store.
///
/// There is no pending state: tasks are created upstream and are already
/// `processing` by the time this service touches them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Returns the status name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// Whether no further transition may happen from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Media kind
// ============================================================================

/// Kind of media the caller wants out of the remote resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DownloadKind {
    #[default]
    Video,
    Audio,
}

impl DownloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadKind::Video => "video",
            DownloadKind::Audio => "audio",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "video" => Some(DownloadKind::Video),
            "audio" => Some(DownloadKind::Audio),
            _ => None,
        }
    }
}

impl fmt::Display for DownloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Download request as received from a caller, before validation.
///
/// Every field is optional here so that missing values surface as a
/// [`ValidationError`] naming the field rather than a generic parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub download_type: Option<String>,
    #[serde(default)]
    pub include_subtitles: Option<bool>,
}

/// A validated download task, ready to enter the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadTask {
    pub task_id: String,
    pub video_url: String,
    pub quality: String,
    pub format: String,
    pub download_type: DownloadKind,
    pub include_subtitles: bool,
}

impl DownloadTask {
    /// Build a task with default options. The values are validated.
    pub fn new(
        task_id: impl Into<String>,
        video_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::try_from(DownloadRequest {
            task_id: Some(task_id.into()),
            video_url: Some(video_url.into()),
            ..Default::default()
        })
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = non_empty_or(Some(quality.into()), DEFAULT_QUALITY);
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = non_empty_or(Some(format.into()), DEFAULT_FORMAT);
        self
    }

    pub fn with_download_type(mut self, download_type: DownloadKind) -> Self {
        self.download_type = download_type;
        self
    }

    pub fn with_subtitles(mut self, include_subtitles: bool) -> Self {
        self.include_subtitles = include_subtitles;
        self
    }
}

impl TryFrom<DownloadRequest> for DownloadTask {
    type Error = ValidationError;

    fn try_from(request: DownloadRequest) -> Result<Self, Self::Error> {
        let task_id = validate_task_id(request.task_id)?;
        let video_url = validate_video_url(request.video_url)?;

        let download_type = match request.download_type.as_deref().map(str::trim) {
            None | Some("") => DownloadKind::default(),
            Some(raw) => DownloadKind::parse(raw).ok_or_else(|| ValidationError::Invalid {
                field: "download_type",
                reason: format!("unknown download type '{}' (expected video or audio)", raw),
            })?,
        };

        Ok(Self {
            task_id,
            video_url,
            quality: non_empty_or(request.quality, DEFAULT_QUALITY),
            format: non_empty_or(request.format, DEFAULT_FORMAT),
            download_type,
            include_subtitles: request.include_subtitles.unwrap_or(false),
        })
    }
}

fn validate_task_id(task_id: Option<String>) -> Result<String, ValidationError> {
    let task_id = task_id.ok_or(ValidationError::Missing("task_id"))?;

    if task_id.trim().is_empty() {
        return Err(ValidationError::Missing("task_id"));
    }
    if task_id.chars().count() > MAX_TASK_ID_LEN {
        return Err(ValidationError::Invalid {
            field: "task_id",
            reason: format!("longer than {} characters", MAX_TASK_ID_LEN),
        });
    }
    if task_id.chars().any(char::is_control) {
        return Err(ValidationError::Invalid {
            field: "task_id",
            reason: "contains control characters".to_string(),
        });
    }

    Ok(task_id)
}

fn validate_video_url(video_url: Option<String>) -> Result<String, ValidationError> {
    let video_url = video_url.ok_or(ValidationError::Missing("video_url"))?;
    let trimmed = video_url.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Missing("video_url"));
    }

    let parsed = reqwest::Url::parse(trimmed).map_err(|e| ValidationError::Invalid {
        field: "video_url",
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::Invalid {
            field: "video_url",
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(trimmed.to_string())
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

// ============================================================================
// Transitions
// ============================================================================

/// An edge of the task lifecycle state machine.
///
/// `Processing` is entered when a request is accepted; `Completed` and
/// `Failed` are terminal and nothing leads back out of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTransition {
    Processing,
    Completed { file_url: String },
    Failed { error_message: String },
}

impl TaskTransition {
    /// Status the task is in after this transition.
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskTransition::Processing => TaskStatus::Processing,
            TaskTransition::Completed { .. } => TaskStatus::Completed,
            TaskTransition::Failed { .. } => TaskStatus::Failed,
        }
    }

    /// Build the store update for this transition at the given instant.
    pub fn to_update(&self, now: DateTime<Utc>) -> TaskUpdate {
        match self {
            TaskTransition::Processing => TaskUpdate {
                status: TaskStatus::Processing,
                progress: Some(0),
                file_url: None,
                error_message: None,
                updated_at: now,
                completed_at: None,
            },
            TaskTransition::Completed { file_url } => TaskUpdate {
                status: TaskStatus::Completed,
                progress: Some(100),
                file_url: Some(file_url.clone()),
                error_message: None,
                updated_at: now,
                completed_at: Some(now),
            },
            TaskTransition::Failed { error_message } => TaskUpdate {
                status: TaskStatus::Failed,
                progress: None,
                file_url: None,
                error_message: Some(error_message.clone()),
                updated_at: now,
                completed_at: None,
            },
        }
    }
}

/// Partial-field update written to the task store.
///
/// `file_url` and `error_message` always serialize, as `null` when unset, so
/// a write clears whichever of the two does not belong to the new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub file_url: Option<String>,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    /// Whether the populated result field matches the status.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            TaskStatus::Processing => self.file_url.is_none() && self.error_message.is_none(),
            TaskStatus::Completed => {
                self.file_url.as_deref().is_some_and(|u| !u.is_empty())
                    && self.error_message.is_none()
            }
            TaskStatus::Failed => {
                self.error_message.as_deref().is_some_and(|m| !m.is_empty())
                    && self.file_url.is_none()
            }
        }
    }
}
