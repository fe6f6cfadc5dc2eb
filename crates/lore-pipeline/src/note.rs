//! Re-parsing of generated note Markdown.
//!
//! Summaries come back from the model as Markdown with `##` section
//! headings. The record stage reads the Summary, Key Takeaways and
//! Suggested Tags sections back out rather than trusting the model to
//! return structured data.

use lore_core::normalize_tags;

const SUMMARY_HEADING: &str = "summary";
const TAKEAWAYS_HEADING: &str = "key takeaways";
const TAGS_HEADING: &str = "suggested tags";

/// Markdown split into `##`-delimited sections.
#[derive(Debug, Clone, Default)]
pub struct NoteSections {
    /// (normalized heading, body) in document order.
    sections: Vec<(String, String)>,
}

/// Split Markdown on `##` headings. Text before the first heading is
/// discarded. Heading matching tolerates enumeration, bold markers and
/// trailing colons ("## 1. **Summary:**" matches "summary").
pub fn parse_sections(markdown: &str) -> NoteSections {
    let mut sections: Vec<(String, String)> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("##") {
            if let Some((heading, body)) = current.take() {
                sections.push((heading, body.join("\n").trim().to_string()));
            }
            current = Some((normalize_heading(trimmed), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((heading, body)) = current {
        sections.push((heading, body.join("\n").trim().to_string()));
    }

    NoteSections { sections }
}

impl NoteSections {
    /// Body of the first section whose normalized heading matches.
    pub fn section(&self, name: &str) -> Option<&str> {
        let wanted = name.to_lowercase();
        self.sections
            .iter()
            .find(|(heading, _)| *heading == wanted)
            .map(|(_, body)| body.as_str())
    }

    pub fn summary(&self) -> Option<&str> {
        self.section(SUMMARY_HEADING)
    }

    pub fn key_takeaways(&self) -> Option<&str> {
        self.section(TAKEAWAYS_HEADING)
    }

    /// Suggested tags, parsed from comma or newline separated text with
    /// bullet markers stripped, lowercased and deduplicated.
    pub fn suggested_tags(&self) -> Vec<String> {
        let Some(body) = self.section(TAGS_HEADING) else {
            return Vec::new();
        };
        let raw: Vec<String> = body
            .split(['\n', ','])
            .map(|piece| {
                piece
                    .trim()
                    .trim_start_matches(['-', '*', '#'])
                    .trim()
                    .to_string()
            })
            .collect();
        normalize_tags(raw)
    }
}

fn normalize_heading(line: &str) -> String {
    line.trim_start_matches('#')
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
        .replace('*', "")
        .trim()
        .trim_end_matches(':')
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_inference::{MockBackend, SummarizationBackend, SummarizationRequest};

    const NOTE: &str = "intro line\n\
        ## Summary\nA short recap of the article.\n\n\
        ## Key Takeaways\n- first point\n- second point\n\n\
        ## Suggested Tags\nRust, async, Rust\n- databases\n";

    #[test]
    fn test_sections_parsed() {
        let sections = parse_sections(NOTE);
        assert_eq!(sections.summary(), Some("A short recap of the article."));
        assert_eq!(
            sections.key_takeaways(),
            Some("- first point\n- second point")
        );
    }

    #[test]
    fn test_tags_lowercased_and_deduplicated() {
        let sections = parse_sections(NOTE);
        assert_eq!(sections.suggested_tags(), vec!["rust", "async", "databases"]);
    }

    #[test]
    fn test_decorated_headings_match() {
        let sections =
            parse_sections("## 2. **Key Takeaways:**\n- only point\n\n## 3. Suggested Tags:\nml");
        assert_eq!(sections.key_takeaways(), Some("- only point"));
        assert_eq!(sections.suggested_tags(), vec!["ml"]);
    }

    #[test]
    fn test_missing_section_is_none() {
        let sections = parse_sections("## Summary\nonly a summary");
        assert!(sections.key_takeaways().is_none());
        assert!(sections.suggested_tags().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_with_mock_summarizer() {
        let backend = MockBackend::new();
        let output = backend
            .summarize(&SummarizationRequest {
                title: "Garden Notes".to_string(),
                text: "tomato tomato compost watering".to_string(),
                context: None,
            })
            .await
            .unwrap();

        let sections = parse_sections(&output);
        assert!(sections.summary().is_some());
        assert!(sections.key_takeaways().is_some());
        assert_eq!(
            sections.suggested_tags(),
            vec!["tomato", "compost", "watering"]
        );
    }
}
