//! Whisper-compatible HTTP transcription client.

use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use lore_core::{Error, HubConfig, Result};

// Long audio takes a while server-side.
const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(300);

/// Client for an OpenAI-compatible `/audio/transcriptions` endpoint.
pub struct WhisperClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl WhisperClient {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.transcription_model.clone(),
            api_key: config.resolve_api_key(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Transcribe an audio file's bytes to plain text.
    pub async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = reqwest::multipart::Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str("audio/mpeg")
            .map_err(|e| Error::api(format!("Failed to build upload: {}", e), "Whisper"))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "json");

        let mut request = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(TRANSCRIBE_TIMEOUT);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            Error::api(format!("Transcription request failed: {}", e), "Whisper")
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: format!("Transcription returned HTTP {}: {}", status, body),
                source_name: "Whisper".to_string(),
                status: Some(status.as_u16()),
            });
        }

        let parsed: TranscriptionResponse = response.json().await.map_err(|e| {
            Error::api(format!("Invalid transcription response: {}", e), "Whisper")
        })?;

        info!(
            subsystem = "extract",
            component = "transcribe",
            op = "transcribe",
            model = %self.model,
            response_len = parsed.text.len(),
            "Audio transcribed"
        );
        Ok(parsed.text)
    }
}
