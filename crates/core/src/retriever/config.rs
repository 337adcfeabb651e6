//! Configuration for the retriever module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp based retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// Directory downloaded artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Public base URL under which `output_dir` is served.
    /// When unset, artifacts are referenced by `file://` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,

    /// Additional yt-dlp arguments, inserted before the video URL.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_output_dir() -> PathBuf {
    std::env::temp_dir().join("vidfetch")
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            output_dir: default_output_dir(),
            public_base_url: None,
            extra_args: Vec::new(),
        }
    }
}
