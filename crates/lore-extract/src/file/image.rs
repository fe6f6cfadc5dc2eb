//! Image intake.
//!
//! There is no OCR stage; an image is recorded with a structured
//! description (format, dimensions, size) that the summarizer and
//! search can work with.

use std::path::Path;

use lore_core::{ContentType, Error, ExtractionResult, Result};

use super::build_result;

pub(super) fn extract(path: &Path) -> Result<ExtractionResult> {
    let bytes = std::fs::read(path).map_err(|e| {
        Error::filesystem(
            format!("Cannot read {}: {}", path.display(), e),
            "Check the file path and permissions.",
        )
    })?;

    let format = infer::get(&bytes)
        .map(|kind| kind.extension().to_uppercase())
        .ok_or_else(|| Error::validation("File is not a recognized image format", "file"))?;

    let dimensions = imagesize::blob_size(&bytes)
        .map_err(|e| Error::validation(format!("Image processing error: {}", e), "file"))?;

    let description = format!(
        "Image Analysis:\n\
         Format: {}\n\
         Dimensions: {} x {} pixels\n\
         File size: {} bytes\n\n\
         Note: text within the image is not extracted.",
        format,
        dimensions.width,
        dimensions.height,
        bytes.len()
    );

    Ok(build_result(path, None, description, ContentType::Image))
}

#[cfg(test)]
mod tests {
    use super::*;

    // GIF89a header with a 10 x 5 logical screen.
    fn gif_bytes() -> Vec<u8> {
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&[0x0A, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00]);
        bytes
    }

    #[test]
    fn test_image_description() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vacation_photo.gif");
        std::fs::write(&path, gif_bytes()).unwrap();

        let result = extract(&path).unwrap();
        assert_eq!(result.title, "Vacation Photo");
        assert_eq!(result.content_type, Some(ContentType::Image));
        assert!(result.text.contains("Format: GIF"));
        assert!(result.text.contains("Dimensions: 10 x 5 pixels"));
    }

    #[test]
    fn test_non_image_bytes_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"this is plain text").unwrap();

        let err = extract(&path).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
