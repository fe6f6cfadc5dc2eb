//! Video extraction: audio download plus transcription.
//!
//! Audio is downloaded with the `yt-dlp` command-line tool into a
//! temporary directory that is removed on every exit path, success or
//! failure, by the `TempDir` guard. The audio never touches the vault.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use lore_core::config::AudioOptions;
use lore_core::{ContentType, Error, ExtractionResult, HubConfig, Result};

use crate::transcribe::WhisperClient;

const DEFAULT_DOWNLOADER: &str = "yt-dlp";
const UNKNOWN_TITLE: &str = "Unknown Video Title";

/// Extracts a transcript from a video URL.
pub struct VideoExtractor {
    whisper: WhisperClient,
    audio: AudioOptions,
    min_transcript_chars: usize,
    downloader: String,
}

impl VideoExtractor {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            whisper: WhisperClient::new(config),
            audio: config.audio_download.clone(),
            min_transcript_chars: config.min_transcript_chars,
            downloader: DEFAULT_DOWNLOADER.to_string(),
        }
    }

    /// Override the downloader binary. Used by tests to substitute a
    /// stub for `yt-dlp`.
    pub fn with_downloader(mut self, bin: impl Into<String>) -> Self {
        self.downloader = bin.into();
        self
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractionResult> {
        let title = self.video_title(url).await?;

        let workspace = tempfile::tempdir().map_err(|e| {
            Error::filesystem(
                format!("Cannot create temporary audio directory: {}", e),
                "Check available disk space and temp directory permissions.",
            )
        })?;

        let audio_path = self.download_audio(url, workspace.path()).await?;
        let filename = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.mp3".to_string());
        let audio = tokio::fs::read(&audio_path).await.map_err(|e| {
            Error::api(format!("Downloaded audio unreadable: {}", e), "YouTube")
        })?;

        debug!(
            subsystem = "extract",
            component = "video",
            op = "transcribe",
            source_url = url,
            audio_bytes = audio.len(),
            "Transcribing downloaded audio"
        );
        let transcript = self.whisper.transcribe(audio, &filename).await?;

        if transcript.trim().chars().count() < self.min_transcript_chars {
            return Err(Error::api(
                "Transcript is empty or too short; the video may have no speech",
                "YouTube",
            ));
        }

        info!(
            subsystem = "extract",
            component = "video",
            op = "extract",
            source_url = url,
            text_len = transcript.len(),
            "Video transcribed"
        );

        let mut result = ExtractionResult::new(title, transcript.trim());
        result.content_type = Some(ContentType::Video);
        Ok(result)
    }

    async fn video_title(&self, url: &str) -> Result<String> {
        let output = Command::new(&self.downloader)
            .args(["--no-warnings", "--print", "title", url])
            .output()
            .await
            .map_err(|e| {
                Error::api(
                    format!("Failed to run {}: {}", self.downloader, e),
                    "YouTube",
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::api(
                format!("Video title lookup failed: {}", stderr.trim()),
                "YouTube",
            ));
        }

        let title = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if title.is_empty() {
            Ok(UNKNOWN_TITLE.to_string())
        } else {
            Ok(title)
        }
    }

    async fn download_audio(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        let template = dir.join("audio.%(ext)s");
        let output = Command::new(&self.downloader)
            .args([
                "--no-warnings",
                "-f",
                &self.audio.format,
                "-x",
                "--audio-format",
                &self.audio.audio_codec,
                "--audio-quality",
                &self.audio.audio_quality,
                "-o",
            ])
            .arg(&template)
            .arg(url)
            .output()
            .await
            .map_err(|e| {
                Error::api(
                    format!("Failed to run {}: {}", self.downloader, e),
                    "YouTube",
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::api(
                format!("Audio download failed: {}", stderr.trim()),
                "YouTube",
            ));
        }

        // The downloader substitutes the real extension; take whatever
        // landed in the workspace.
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            Error::api(format!("Cannot inspect audio workspace: {}", e), "YouTube")
        })?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::api(format!("Cannot inspect audio workspace: {}", e), "YouTube"))?
        {
            if entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false)
            {
                return Ok(entry.path());
            }
        }

        Err(Error::api(
            "Audio download produced no file",
            "YouTube",
        ))
    }
}
