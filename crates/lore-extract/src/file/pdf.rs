//! PDF text extraction.

use std::path::Path;

use lore_core::{ContentType, Error, ExtractionResult, Result};

use super::{build_result, clean_extracted_text};

pub(super) fn extract(path: &Path) -> Result<ExtractionResult> {
    let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| {
        Error::validation(format!("PDF processing error: {}", e), "file")
    })?;

    let mut content = String::new();
    for (number, page) in pages.iter().enumerate() {
        let page = clean_extracted_text(page);
        if page.is_empty() {
            continue;
        }
        content.push_str(&format!("\n\n--- Page {} ---\n\n", number + 1));
        content.push_str(&page);
    }
    let content = content.trim().to_string();

    Ok(build_result(path, None, content, ContentType::Pdf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_pdf_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = extract(&path).unwrap_err();
        match err {
            Error::Validation { message, field } => {
                assert_eq!(field.as_deref(), Some("file"));
                assert!(message.contains("PDF"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }
}
