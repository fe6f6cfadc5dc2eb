//! Prompt assembly for summarization requests.

use crate::SummarizationRequest;

/// Appended to text that exceeded the character budget.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated]";

/// Fill the configured template with the request fields. The extracted
/// text is cut to `char_budget` characters first so one very long
/// source cannot blow the model's context window.
pub fn build_prompt(template: &str, request: &SummarizationRequest, char_budget: usize) -> String {
    let text = truncate_chars(&request.text, char_budget);
    let context = request.context.as_deref().unwrap_or("None");
    template
        .replace("{title}", &request.title)
        .replace("{text}", &text)
        .replace("{context}", context)
}

/// Cut at a character boundary, never a byte offset.
fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(budget).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "Title: {title}\nText: {text}\nContext: {context}";

    #[test]
    fn test_placeholders_filled() {
        let request = SummarizationRequest {
            title: "Rust Patterns".to_string(),
            text: "ownership and borrowing".to_string(),
            context: Some("from a blog".to_string()),
        };
        let prompt = build_prompt(TEMPLATE, &request, 12_000);
        assert_eq!(
            prompt,
            "Title: Rust Patterns\nText: ownership and borrowing\nContext: from a blog"
        );
    }

    #[test]
    fn test_missing_context_becomes_none() {
        let request = SummarizationRequest {
            title: "t".to_string(),
            text: "x".to_string(),
            context: None,
        };
        let prompt = build_prompt(TEMPLATE, &request, 12_000);
        assert!(prompt.ends_with("Context: None"));
    }

    #[test]
    fn test_long_text_truncated_with_marker() {
        let request = SummarizationRequest {
            title: "t".to_string(),
            text: "a".repeat(50),
            context: None,
        };
        let prompt = build_prompt("{title} {text} {context}", &request, 10);
        assert!(prompt.contains(&"a".repeat(10)));
        assert!(!prompt.contains(&"a".repeat(11)));
        assert!(prompt.contains(TRUNCATION_MARKER.trim()));
    }

    #[test]
    fn test_truncation_at_char_boundary() {
        let text = "é".repeat(20);
        let cut = truncate_chars(&text, 5);
        assert!(cut.starts_with(&"é".repeat(5)));
        assert!(cut.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_text_within_budget_untouched() {
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
