//! Plain text and Markdown intake.

use std::path::Path;

use lore_core::{ContentType, Error, ExtractionResult, Result};

use super::{build_result, clean_extracted_text};

pub(super) fn extract(path: &Path) -> Result<ExtractionResult> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::validation(
            format!("Cannot read text file {}: {}", path.display(), e),
            "file",
        )
    })?;

    let content = clean_extracted_text(&raw);
    if content.is_empty() {
        return Err(Error::validation("Text file is empty", "file"));
    }

    Ok(build_result(path, None, content, ContentType::Text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meeting_notes.md");
        std::fs::write(&path, "# Agenda\n\n\n\nDiscuss   roadmap.\n").unwrap();

        let result = extract(&path).unwrap();
        assert_eq!(result.title, "Meeting Notes");
        assert_eq!(result.content_type, Some(ContentType::Text));
        assert_eq!(result.text, "# Agenda\n\nDiscuss roadmap.");
    }

    #[test]
    fn test_empty_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n\n").unwrap();

        let err = extract(&path).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_non_utf8_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xFF, 0xFE, 0x00, 0x9C]).unwrap();

        let err = extract(&path).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
