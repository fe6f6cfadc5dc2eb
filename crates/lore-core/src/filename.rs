//! Filesystem-safe note naming.

use chrono::Utc;

/// Characters that are invalid in filenames on at least one supported
/// platform.
const FORBIDDEN: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Strip forbidden and control characters from a title so it can be used
/// as a filename stem. Whitespace is collapsed and trimmed. An empty
/// result falls back to a timestamped name.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !FORBIDDEN.contains(c))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        timestamp_fallback()
    } else {
        collapsed
    }
}

/// Timestamped fallback name for untitled content.
pub fn timestamp_fallback() -> String {
    format!("note_{}", Utc::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_forbidden_characters() {
        assert_eq!(
            sanitize_title("What is Rust? A <brief> intro: part 1/2"),
            "What is Rust A brief intro part 12"
        );
    }

    #[test]
    fn test_strips_control_characters() {
        assert_eq!(sanitize_title("Hello\tWorld\n"), "Hello World");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(sanitize_title("  spaced   out  title "), "spaced out title");
    }

    #[test]
    fn test_empty_title_falls_back_to_timestamp() {
        let name = sanitize_title("???///");
        assert!(name.starts_with("note_"));
        assert_eq!(name.len(), "note_YYYYMMDD_HHMMSS".len());
    }

    #[test]
    fn test_unicode_preserved() {
        assert_eq!(sanitize_title("Caféへようこそ"), "Caféへようこそ");
    }
}
