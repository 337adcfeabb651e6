//! Retriever module for fetching remote media.
//!
//! This module provides the `Retriever` trait and a yt-dlp based
//! implementation. The orchestrator only sees the trait: given a URL and the
//! requested quality/format it gets back an artifact reference or an error.
//!
//! # Example
//!
//! ```ignore
//! use vidfetch_core::retriever::{Retriever, RetrievalRequest, RetrieverConfig, YtDlpRetriever};
//!
//! let retriever = YtDlpRetriever::new(RetrieverConfig::default());
//! retriever.validate().await?;
//!
//! let artifact = retriever.retrieve(&RetrievalRequest {
//!     task_id: "abc123".to_string(),
//!     video_url: "https://example.com/watch?v=xyz".to_string(),
//!     quality: "720p".to_string(),
//!     format: "mp4".to_string(),
//!     download_type: DownloadKind::Video,
//!     include_subtitles: false,
//! }).await?;
//! println!("Artifact at {}", artifact.file_url);
//! ```

mod config;
mod error;
mod traits;
mod types;
mod ytdlp;

pub use config::RetrieverConfig;
pub use error::RetrievalError;
pub use traits::Retriever;
pub use types::{Artifact, RetrievalRequest};
pub use ytdlp::YtDlpRetriever;
