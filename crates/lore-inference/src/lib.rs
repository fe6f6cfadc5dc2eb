//! # lore-inference
//!
//! Summarization backend abstraction for the lorevault knowledge hub.
//!
//! This crate provides:
//! - The pluggable [`SummarizationBackend`] trait
//! - An OpenAI-compatible chat completions backend
//! - A deterministic offline mock backend
//! - Prompt assembly with a character budget

pub mod mock;
pub mod openai;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;

use lore_core::{Error, HubConfig, Result};

pub use mock::MockBackend;
pub use openai::OpenAiBackend;
pub use prompt::{build_prompt, TRUNCATION_MARKER};

/// One summarization job: the extracted content plus optional
/// user-supplied context.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    pub title: String,
    pub text: String,
    pub context: Option<String>,
}

/// A backend that turns extracted content into a Markdown note body.
#[async_trait]
pub trait SummarizationBackend: Send + Sync + std::fmt::Debug {
    async fn summarize(&self, request: &SummarizationRequest) -> Result<String>;

    /// Backend id as it appears in configuration.
    fn name(&self) -> &str;
}

/// Construct the backend named by the configuration.
pub fn backend_from_config(config: &HubConfig) -> Result<Arc<dyn SummarizationBackend>> {
    match config.backend.as_str() {
        "openai" => Ok(Arc::new(OpenAiBackend::new(config))),
        "mock" => Ok(Arc::new(MockBackend::new())),
        other => Err(Error::Config(format!(
            "Unknown summarization backend '{}', expected \"openai\" or \"mock\"",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_config() {
        let openai = backend_from_config(&HubConfig::default()).unwrap();
        assert_eq!(openai.name(), "openai");

        let mock = backend_from_config(&HubConfig {
            backend: "mock".to_string(),
            ..HubConfig::default()
        })
        .unwrap();
        assert_eq!(mock.name(), "mock");
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let err = backend_from_config(&HubConfig {
            backend: "llamacpp".to_string(),
            ..HubConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("llamacpp"));
    }
}
