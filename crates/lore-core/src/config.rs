//! Configuration for the lorevault pipeline.
//!
//! Loaded once from a JSON document and passed by reference into
//! constructors. Every field has a serde default so a partial (or absent)
//! config file still yields a working setup; unknown keys are ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFAULT_SUMMARIZATION_PROMPT: &str = "Analyze the following text from a source titled \"{title}\".\n\nTEXT:\n\"{text}\"\n\nADDITIONAL CONTEXT:\n{context}\n\nBased on the text, please provide the following in a clear, well-structured format:\n1.  **Summary:** A concise summary of the main points.\n2.  **Key Takeaways:** A bulleted list of the most important insights or actionable items.\n3.  **Suggested Tags:** A short, comma-separated list of 3-5 relevant keywords or tags for categorization.";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes content for a personal knowledge base.";

/// Markdown rendering templates for generated notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownTemplates {
    /// Header template with `{title}`, `{url}` and `{timestamp}` placeholders.
    #[serde(default = "default_header_template")]
    pub header: String,
    /// Body template with a `{content}` placeholder.
    #[serde(default = "default_content_template")]
    pub content: String,
}

fn default_header_template() -> String {
    "# {title}\n\n**Source:** [{url}]({url})\n**Date Processed:** {timestamp}\n\n---\n\n"
        .to_string()
}

fn default_content_template() -> String {
    "{content}\n".to_string()
}

impl Default for MarkdownTemplates {
    fn default() -> Self {
        Self {
            header: default_header_template(),
            content: default_content_template(),
        }
    }
}

/// Options passed to the audio downloader subprocess.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioOptions {
    #[serde(default = "default_audio_format")]
    pub format: String,
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,
}

fn default_audio_format() -> String {
    "bestaudio/best".to_string()
}

fn default_audio_codec() -> String {
    "mp3".to_string()
}

fn default_audio_quality() -> String {
    "192".to_string()
}

impl Default for AudioOptions {
    fn default() -> Self {
        Self {
            format: default_audio_format(),
            audio_codec: default_audio_codec(),
            audio_quality: default_audio_quality(),
        }
    }
}

/// Top-level configuration for the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Directory where notes and images are written. A leading `~` is
    /// expanded against the home directory.
    pub vault_path: String,
    /// Summarization backend: "openai" for the live API, "mock" for the
    /// deterministic offline backend.
    pub backend: String,
    /// Chat-completions model id.
    pub model: String,
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// API key. Falls back to the OPENAI_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Transcription model id for the Whisper-compatible endpoint.
    pub transcription_model: String,
    /// strftime-style format for the note timestamp.
    pub date_format: String,
    /// Note filename template with a `{title}` placeholder.
    pub filename_template: String,
    pub markdown_template: MarkdownTemplates,
    pub audio_download: AudioOptions,
    /// Prompt template with `{title}`, `{text}` and `{context}` placeholders.
    pub summarization_prompt: String,
    pub system_prompt: String,

    // Thresholds
    /// Minimum extracted article length in characters.
    pub min_article_chars: usize,
    /// Minimum transcript length in characters.
    pub min_transcript_chars: usize,
    /// Character budget for the text inserted into the prompt.
    pub prompt_char_budget: usize,
    /// Minimum acceptable summary response length.
    pub min_summary_chars: usize,
    /// Maximum article images to download.
    pub max_images: usize,
    /// Per-image download cap in bytes.
    pub max_image_bytes: u64,
    /// Minimum relatedness score for suggestions.
    pub related_min_score: f64,
    /// Maximum related items returned.
    pub related_max: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            vault_path: "~/KnowledgeHub".to_string(),
            backend: "openai".to_string(),
            model: "gpt-5-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            transcription_model: "whisper-1".to_string(),
            date_format: "%Y-%m-%d %H:%M".to_string(),
            filename_template: "{title}.md".to_string(),
            markdown_template: MarkdownTemplates::default(),
            audio_download: AudioOptions::default(),
            summarization_prompt: DEFAULT_SUMMARIZATION_PROMPT.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            min_article_chars: 200,
            min_transcript_chars: 10,
            prompt_char_budget: 12_000,
            min_summary_chars: 50,
            max_images: 5,
            max_image_bytes: 10 * 1024 * 1024,
            related_min_score: 0.3,
            related_max: 5,
        }
    }
}

impl HubConfig {
    /// Load configuration from a JSON file. A missing file yields the
    /// defaults; a malformed file or invalid template is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<HubConfig>(&raw)
                .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?
        } else {
            HubConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check template placeholders that later stages rely on.
    pub fn validate(&self) -> Result<()> {
        for placeholder in ["{title}", "{text}", "{context}"] {
            if !self.summarization_prompt.contains(placeholder) {
                return Err(Error::Config(format!(
                    "Summarization prompt is missing the {} placeholder",
                    placeholder
                )));
            }
        }
        if !self.filename_template.contains("{title}") {
            return Err(Error::Config(
                "Filename template is missing the {title} placeholder".to_string(),
            ));
        }
        Ok(())
    }

    /// Vault path with `~` expanded against $HOME.
    pub fn vault_dir(&self) -> PathBuf {
        if let Some(rest) = self.vault_path.strip_prefix("~") {
            if let Ok(home) = std::env::var("HOME") {
                let rest = rest.trim_start_matches('/');
                return PathBuf::from(home).join(rest);
            }
        }
        PathBuf::from(&self.vault_path)
    }

    /// API key from config, falling back to OPENAI_API_KEY.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }

    /// Path of the metadata database inside the vault.
    pub fn database_path(&self) -> PathBuf {
        self.vault_dir().join("lorevault.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = HubConfig::default();
        config.validate().unwrap();
        assert_eq!(config.model, "gpt-5-mini");
        assert_eq!(config.min_article_chars, 200);
        assert_eq!(config.prompt_char_budget, 12_000);
        assert_eq!(config.max_images, 5);
        assert_eq!(config.max_image_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = HubConfig::load("/nonexistent/config.json").unwrap();
        assert_eq!(config.backend, "openai");
        assert_eq!(config.filename_template, "{title}.md");
    }

    #[test]
    fn test_partial_file_fills_defaults_and_ignores_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(
            f,
            r#"{{"model": "gpt-4o", "backend": "mock", "not_a_real_key": 7}}"#
        )
        .unwrap();

        let config = HubConfig::load(&path).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.backend, "mock");
        assert_eq!(config.date_format, "%Y-%m-%d %H:%M");
    }

    #[test]
    fn test_prompt_missing_text_placeholder_fails_validation() {
        let config = HubConfig {
            summarization_prompt: "Summarize {title} with {context}".to_string(),
            ..HubConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{text}"));
    }

    #[test]
    fn test_filename_template_requires_title() {
        let config = HubConfig {
            filename_template: "note.md".to_string(),
            ..HubConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = HubConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_vault_dir_expands_tilde() {
        let config = HubConfig {
            vault_path: "~/Vault".to_string(),
            ..HubConfig::default()
        };
        let dir = config.vault_dir();
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(dir, PathBuf::from(home).join("Vault"));
        }
    }

    #[test]
    fn test_database_path_inside_vault() {
        let config = HubConfig {
            vault_path: "/tmp/vault".to_string(),
            ..HubConfig::default()
        };
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/vault/lorevault.db")
        );
    }
}
