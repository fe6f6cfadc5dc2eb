//! Deterministic offline summarization backend.
//!
//! Produces a well-formed note body from keyword frequencies alone, so
//! the full pipeline can run in tests and demos with no API key and no
//! network. The output always carries the three section headings the
//! note parser looks for.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use lore_core::keywords::top_keywords;
use lore_core::{Error, Result};

use crate::{SummarizationBackend, SummarizationRequest};

const TAG_COUNT: usize = 5;
const TAKEAWAY_COUNT: usize = 3;

/// Offline backend with a call log for assertions.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    calls: Arc<Mutex<Vec<SummarizationRequest>>>,
    fail: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every summarize call fail. Used to exercise retry and
    /// error-reporting paths.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Requests seen so far, in order.
    pub fn calls(&self) -> Vec<SummarizationRequest> {
        self.calls.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|log| log.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SummarizationBackend for MockBackend {
    async fn summarize(&self, request: &SummarizationRequest) -> Result<String> {
        if let Ok(mut log) = self.calls.lock() {
            log.push(request.clone());
        }
        if self.fail {
            return Err(Error::api("Mock backend configured to fail", "OpenAI"));
        }

        let keywords = top_keywords(&request.text, TAG_COUNT);
        let word_count = request.text.split_whitespace().count();

        let takeaways = if keywords.is_empty() {
            "- No prominent topics detected".to_string()
        } else {
            keywords
                .iter()
                .take(TAKEAWAY_COUNT)
                .map(|k| format!("- The source discusses {}", k))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let tags = if keywords.is_empty() {
            "untagged".to_string()
        } else {
            keywords.join(", ")
        };

        Ok(format!(
            "## Summary\n\"{}\" contains {} words. Frequent topics: {}.\n\n\
             ## Key Takeaways\n{}\n\n\
             ## Suggested Tags\n{}",
            request.title, word_count, tags, takeaways, tags
        ))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SummarizationRequest {
        SummarizationRequest {
            title: "Garden Notes".to_string(),
            text: "tomato tomato tomato compost compost watering".to_string(),
            context: None,
        }
    }

    #[tokio::test]
    async fn test_output_is_deterministic_and_sectioned() {
        let backend = MockBackend::new();
        let first = backend.summarize(&request()).await.unwrap();
        let second = backend.summarize(&request()).await.unwrap();
        assert_eq!(first, second);
        assert!(first.contains("## Summary"));
        assert!(first.contains("## Key Takeaways"));
        assert!(first.contains("## Suggested Tags"));
        assert!(first.contains("tomato, compost, watering"));
    }

    #[tokio::test]
    async fn test_call_log() {
        let backend = MockBackend::new();
        backend.summarize(&request()).await.unwrap();
        backend.summarize(&request()).await.unwrap();
        assert_eq!(backend.call_count(), 2);
        assert_eq!(backend.calls()[0].title, "Garden Notes");
    }

    #[tokio::test]
    async fn test_failing_backend() {
        let backend = MockBackend::new().failing();
        let err = backend.summarize(&request()).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_still_well_formed() {
        let backend = MockBackend::new();
        let request = SummarizationRequest {
            title: "Blank".to_string(),
            text: String::new(),
            context: None,
        };
        let output = backend.summarize(&request).await.unwrap();
        assert!(output.contains("## Suggested Tags\nuntagged"));
    }
}
