//! OpenAI-compatible chat completions backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lore_core::{Error, HubConfig, Result};

use crate::prompt::build_prompt;
use crate::{SummarizationBackend, SummarizationRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Summarizes through a `/chat/completions` endpoint.
#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    system_prompt: String,
    prompt_template: String,
    char_budget: usize,
    min_summary_chars: usize,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl OpenAiBackend {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
            system_prompt: config.system_prompt.clone(),
            prompt_template: config.summarization_prompt.clone(),
            char_budget: config.prompt_char_budget,
            min_summary_chars: config.min_summary_chars,
        }
    }
}

#[async_trait]
impl SummarizationBackend for OpenAiBackend {
    async fn summarize(&self, request: &SummarizationRequest) -> Result<String> {
        let prompt = build_prompt(&self.prompt_template, request, self.char_budget);
        debug!(
            subsystem = "inference",
            component = "openai",
            op = "summarize",
            model = %self.model,
            prompt_len = prompt.len(),
            "Requesting summary"
        );

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&raw)
                .map(|b| b.error.message)
                .unwrap_or(raw);
            return Err(Error::Api {
                message: format!("Chat completion failed: {}", message),
                source_name: "OpenAI".to_string(),
                status: Some(status.as_u16()),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            Error::api(format!("Malformed chat completion response: {}", e), "OpenAI")
        })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| Error::api("Chat completion returned no choices", "OpenAI"))?;

        if content.chars().count() < self.min_summary_chars {
            return Err(Error::api(
                format!(
                    "Summary response too short ({} chars), the model returned a degenerate answer",
                    content.chars().count()
                ),
                "OpenAI",
            ));
        }

        info!(
            subsystem = "inference",
            component = "openai",
            op = "summarize",
            model = %self.model,
            response_len = content.len(),
            "Summary received"
        );
        Ok(content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
