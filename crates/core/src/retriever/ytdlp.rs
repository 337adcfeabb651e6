//! yt-dlp based retriever implementation.

use async_trait::async_trait;
use reqwest::Url;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::config::RetrieverConfig;
use super::error::RetrievalError;
use super::traits::Retriever;
use super::types::{Artifact, RetrievalRequest};
use crate::task::DownloadKind;

/// Containers yt-dlp can merge video streams into.
const VIDEO_FORMATS: &[&str] = &["mp4", "mkv", "webm"];

/// Audio formats yt-dlp can extract to.
const AUDIO_FORMATS: &[&str] = &["mp3", "m4a", "opus", "flac", "wav", "aac"];

/// Retriever that shells out to yt-dlp.
pub struct YtDlpRetriever {
    config: RetrieverConfig,
}

impl YtDlpRetriever {
    /// Creates a new yt-dlp retriever with the given configuration.
    pub fn new(config: RetrieverConfig) -> Self {
        Self { config }
    }

    /// Creates a retriever with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RetrieverConfig::default())
    }

    /// Builds the yt-dlp `-f` selector for a quality tier.
    ///
    /// `"720p"` caps the height at 720; anything without a height
    /// (`"best"`, `"highest"`, garbage) takes the best available streams.
    fn format_selector(quality: &str, kind: DownloadKind) -> String {
        if kind == DownloadKind::Audio {
            return "ba/b".to_string();
        }

        match parse_height(quality) {
            Some(height) => format!("bv*[height<={h}]+ba/b[height<={h}]", h = height),
            None => "bv*+ba/b".to_string(),
        }
    }

    /// Builds yt-dlp arguments for a retrieval.
    fn build_args(&self, request: &RetrievalRequest) -> Result<Vec<String>, RetrievalError> {
        let format = request.format.to_ascii_lowercase();
        let supported = match request.download_type {
            DownloadKind::Video => VIDEO_FORMATS,
            DownloadKind::Audio => AUDIO_FORMATS,
        };
        if !supported.contains(&format.as_str()) {
            return Err(RetrievalError::UnsupportedFormat {
                format: request.format.clone(),
                kind: request.download_type,
            });
        }

        let output_template = self
            .config
            .output_dir
            .join(format!("{}.%(ext)s", file_stem(&request.task_id)));

        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "--force-overwrites".to_string(),
            "-f".to_string(),
            Self::format_selector(&request.quality, request.download_type),
        ];

        // Output shape
        match request.download_type {
            DownloadKind::Video => {
                args.extend(["--merge-output-format".to_string(), format]);
            }
            DownloadKind::Audio => {
                args.extend(["-x".to_string(), "--audio-format".to_string(), format]);
            }
        }

        // Subtitles
        if request.include_subtitles {
            args.extend([
                "--write-subs".to_string(),
                "--sub-langs".to_string(),
                "all".to_string(),
            ]);
            if request.download_type == DownloadKind::Video {
                args.push("--embed-subs".to_string());
            }
        }

        // Final path after post-processing, on stdout
        args.extend(["--print".to_string(), "after_move:filepath".to_string()]);

        args.extend([
            "-o".to_string(),
            output_template.to_string_lossy().to_string(),
        ]);

        // Extra args
        args.extend(self.config.extra_args.iter().cloned());

        args.push("--".to_string());
        args.push(request.video_url.clone());

        Ok(args)
    }

    /// Turns a local output path into the reference handed back to callers.
    fn artifact_for(&self, path: PathBuf) -> Result<Artifact, RetrievalError> {
        let file_url = match &self.config.public_base_url {
            Some(base) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .ok_or_else(|| {
                        RetrievalError::failed(format!(
                            "yt-dlp reported an invalid output path: {}",
                            path.display()
                        ))
                    })?;
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    urlencoding::encode(&file_name)
                )
            }
            None => Url::from_file_path(&path)
                .map_err(|_| {
                    RetrievalError::failed(format!(
                        "yt-dlp reported a non-absolute output path: {}",
                        path.display()
                    ))
                })?
                .to_string(),
        };

        Ok(Artifact {
            file_url,
            path: Some(path),
        })
    }

    fn spawn_error(&self, e: std::io::Error) -> RetrievalError {
        if e.kind() == std::io::ErrorKind::NotFound {
            RetrievalError::BinaryNotFound {
                path: self.config.ytdlp_path.clone(),
            }
        } else {
            RetrievalError::Io(e)
        }
    }
}

#[async_trait]
impl Retriever for YtDlpRetriever {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn retrieve(&self, request: &RetrievalRequest) -> Result<Artifact, RetrievalError> {
        let args = self.build_args(request)?;

        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        debug!("Running {:?} {:?}", self.config.ytdlp_path, args);
        let start = Instant::now();

        let output = Command::new(&self.config.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = last_error_line(&stderr).unwrap_or_else(|| {
                format!("yt-dlp exited with {}", output.status)
            });
            warn!(
                "yt-dlp failed for task {}: {}",
                request.task_id, message
            );
            return Err(RetrievalError::Failed(message));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(PathBuf::from)
            .ok_or_else(|| RetrievalError::failed("yt-dlp did not report an output file"))?;

        info!(
            "Retrieved {} for task {} in {} ms",
            path.display(),
            request.task_id,
            start.elapsed().as_millis()
        );

        self.artifact_for(path)
    }

    async fn validate(&self) -> Result<(), RetrievalError> {
        let output = Command::new(&self.config.ytdlp_path)
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(RetrievalError::failed(format!(
                "yt-dlp --version failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // Ensure output dir exists
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        Ok(())
    }
}

/// Extracts the pixel height from a quality tier such as "720p" or "4k".
fn parse_height(quality: &str) -> Option<u32> {
    let q = quality.trim().to_ascii_lowercase();
    match q.as_str() {
        "4k" => return Some(2160),
        "8k" => return Some(4320),
        _ => {}
    }
    q.strip_suffix('p')
        .unwrap_or(&q)
        .parse::<u32>()
        .ok()
        .filter(|h| *h > 0)
}

/// Filesystem-safe file stem for a task id.
///
/// Bytes outside `[A-Za-z0-9-]` are written as `_xx` hex, so distinct ids
/// never share an output file.
fn file_stem(task_id: &str) -> String {
    let mut stem = String::with_capacity(task_id.len());
    for byte in task_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("_{:02x}", byte));
        }
    }
    stem
}

/// Last `ERROR:` line yt-dlp wrote, without the prefix.
fn last_error_line(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix("ERROR:"))
        .map(|msg| msg.trim().to_string())
        .filter(|msg| !msg.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn request(format: &str, kind: DownloadKind) -> RetrievalRequest {
        RetrievalRequest {
            task_id: "abc123".to_string(),
            video_url: "https://example.com/v".to_string(),
            quality: "720p".to_string(),
            format: format.to_string(),
            download_type: kind,
            include_subtitles: false,
        }
    }

    fn retriever(output_dir: &Path) -> YtDlpRetriever {
        YtDlpRetriever::new(RetrieverConfig {
            output_dir: output_dir.to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_height() {
        assert_eq!(parse_height("1080p"), Some(1080));
        assert_eq!(parse_height(" 720P "), Some(720));
        assert_eq!(parse_height("480"), Some(480));
        assert_eq!(parse_height("4k"), Some(2160));
        assert_eq!(parse_height("best"), None);
        assert_eq!(parse_height("0p"), None);
    }

    #[test]
    fn test_format_selector() {
        assert_eq!(
            YtDlpRetriever::format_selector("720p", DownloadKind::Video),
            "bv*[height<=720]+ba/b[height<=720]"
        );
        assert_eq!(
            YtDlpRetriever::format_selector("best", DownloadKind::Video),
            "bv*+ba/b"
        );
        assert_eq!(
            YtDlpRetriever::format_selector("1080p", DownloadKind::Audio),
            "ba/b"
        );
    }

    #[test]
    fn test_file_stem_sanitizes() {
        assert_eq!(file_stem("abc-123"), "abc-123");
        assert_eq!(file_stem("abc_x"), "abc_5fx");
        assert_eq!(file_stem("../etc/passwd"), "_2e_2e_2fetc_2fpasswd");
        assert_eq!(file_stem("a b/c"), "a_20b_2fc");
    }

    #[test]
    fn test_file_stem_is_collision_free() {
        assert_ne!(file_stem("a b"), file_stem("a_b"));
        assert_ne!(file_stem("a_20b"), file_stem("a b"));
        assert_ne!(file_stem("x/y"), file_stem("x_y"));
    }

    #[test]
    fn test_build_args_overwrite_and_distinct_outputs() {
        let r = retriever(Path::new("/srv/out"));
        let output_of = |task_id: &str| {
            let mut req = request("mp4", DownloadKind::Video);
            req.task_id = task_id.to_string();
            let args = r.build_args(&req).unwrap();
            assert!(args.contains(&"--force-overwrites".to_string()));
            let pos = args.iter().position(|a| a == "-o").unwrap();
            args[pos + 1].clone()
        };

        assert_eq!(output_of("abc123"), "/srv/out/abc123.%(ext)s");
        assert_ne!(output_of("a b"), output_of("a_b"));
    }

    #[test]
    fn test_last_error_line() {
        let stderr = "WARNING: something\nERROR: first\nnoise\nERROR: unsupported codec\n";
        assert_eq!(last_error_line(stderr).as_deref(), Some("unsupported codec"));
        assert_eq!(last_error_line("WARNING: only warnings"), None);
    }

    #[test]
    fn test_build_video_args() {
        let r = retriever(Path::new("/srv/out"));
        let args = r.build_args(&request("mp4", DownloadKind::Video)).unwrap();

        assert!(args.windows(2).any(|w| w[0] == "--merge-output-format" && w[1] == "mp4"));
        assert!(args
            .windows(2)
            .any(|w| w[0] == "-o" && w[1] == "/srv/out/abc123.%(ext)s"));
        assert!(args
            .windows(2)
            .any(|w| w[0] == "--print" && w[1] == "after_move:filepath"));
        assert!(!args.contains(&"-x".to_string()));
        assert!(!args.contains(&"--write-subs".to_string()));
        assert_eq!(args.last().unwrap(), "https://example.com/v");
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn test_build_audio_args_with_subtitles() {
        let r = retriever(Path::new("/srv/out"));
        let mut req = request("mp3", DownloadKind::Audio);
        req.include_subtitles = true;
        let args = r.build_args(&req).unwrap();

        assert!(args.contains(&"-x".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "--audio-format" && w[1] == "mp3"));
        assert!(args.contains(&"--write-subs".to_string()));
        assert!(!args.contains(&"--embed-subs".to_string()));
    }

    #[test]
    fn test_build_video_args_with_subtitles_embeds() {
        let r = retriever(Path::new("/srv/out"));
        let mut req = request("mkv", DownloadKind::Video);
        req.include_subtitles = true;
        let args = r.build_args(&req).unwrap();
        assert!(args.contains(&"--embed-subs".to_string()));
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let r = retriever(Path::new("/srv/out"));
        let err = r.build_args(&request("avi", DownloadKind::Video)).unwrap_err();
        assert!(matches!(err, RetrievalError::UnsupportedFormat { .. }));

        let err = r.build_args(&request("mp4", DownloadKind::Audio)).unwrap_err();
        assert!(matches!(err, RetrievalError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_artifact_with_public_base_url() {
        let r = YtDlpRetriever::new(RetrieverConfig {
            public_base_url: Some("https://cdn.example.com/downloads/".to_string()),
            ..Default::default()
        });
        let artifact = r
            .artifact_for(PathBuf::from("/srv/out/abc 123.mp4"))
            .unwrap();
        assert_eq!(
            artifact.file_url,
            "https://cdn.example.com/downloads/abc%20123.mp4"
        );
        assert_eq!(artifact.path, Some(PathBuf::from("/srv/out/abc 123.mp4")));
    }

    #[test]
    fn test_artifact_without_public_base_url() {
        let r = YtDlpRetriever::with_defaults();
        let artifact = r.artifact_for(PathBuf::from("/srv/out/abc123.mp4")).unwrap();
        assert_eq!(artifact.file_url, "file:///srv/out/abc123.mp4");
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let temp = tempfile::TempDir::new().unwrap();
        let r = YtDlpRetriever::new(RetrieverConfig {
            ytdlp_path: PathBuf::from("/nonexistent/yt-dlp"),
            output_dir: temp.path().to_path_buf(),
            ..Default::default()
        });

        let err = r
            .retrieve(&request("mp4", DownloadKind::Video))
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::BinaryNotFound { .. }));

        let err = r.validate().await.unwrap_err();
        assert!(matches!(err, RetrievalError::BinaryNotFound { .. }));
    }

    #[cfg(unix)]
    fn fake_ytdlp(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_retrieve_reads_final_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let out = temp.path().join("out");
        let bin = fake_ytdlp(
            temp.path(),
            &format!("echo '{}/abc123.mp4'", out.display()),
        );
        let r = YtDlpRetriever::new(RetrieverConfig {
            ytdlp_path: bin,
            output_dir: out.clone(),
            public_base_url: Some("https://cdn.example.com/v".to_string()),
            extra_args: Vec::new(),
        });

        let artifact = r.retrieve(&request("mp4", DownloadKind::Video)).await.unwrap();
        assert_eq!(artifact.file_url, "https://cdn.example.com/v/abc123.mp4");
        assert_eq!(artifact.path, Some(out.join("abc123.mp4")));
        assert!(out.is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_retrieve_failure_reports_error_line() {
        let temp = tempfile::TempDir::new().unwrap();
        let bin = fake_ytdlp(
            temp.path(),
            "echo 'ERROR: unsupported codec' >&2\nexit 1",
        );
        let r = YtDlpRetriever::new(RetrieverConfig {
            ytdlp_path: bin,
            output_dir: temp.path().join("out"),
            ..Default::default()
        });

        let err = r
            .retrieve(&request("mp4", DownloadKind::Video))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unsupported codec");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_retrieve_without_output_path_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let bin = fake_ytdlp(temp.path(), "exit 0");
        let r = YtDlpRetriever::new(RetrieverConfig {
            ytdlp_path: bin,
            output_dir: temp.path().join("out"),
            ..Default::default()
        });

        let err = r
            .retrieve(&request("mp4", DownloadKind::Video))
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Failed(_)));
    }
}
