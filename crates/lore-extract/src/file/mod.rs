//! Local file extraction: extension dispatch plus shared text cleanup.

mod docx;
mod image;
mod pdf;
mod sheet;
mod text;

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use lore_core::{ContentType, Error, ExtractionResult, Result};

/// Extracts text and metadata from supported local files.
#[derive(Debug, Default)]
pub struct FileExtractor;

impl FileExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extension list shown to users when rejecting an unsupported file.
    pub fn supported_extensions() -> &'static [&'static str] {
        &[
            "pdf", "docx", "xlsx", "xls", "csv", "jpg", "jpeg", "png", "gif", "bmp", "webp",
            "txt", "md", "markdown",
        ]
    }

    pub async fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        if !path.exists() {
            return Err(Error::validation(
                format!("File not found: {}", path.display()),
                "file",
            ));
        }

        let owned: PathBuf = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || extract_sync(&owned))
            .await
            .map_err(|e| Error::filesystem(
                format!("File extraction task failed: {}", e),
                "Retry the operation.",
            ))??;

        info!(
            subsystem = "extract",
            component = "file",
            op = "extract",
            file_path = %path.display(),
            content_type = %result.content_type.map(|c| c.as_str()).unwrap_or("unknown"),
            word_count = result.word_count,
            "File extracted"
        );
        Ok(result)
    }
}

fn extract_sync(path: &Path) -> Result<ExtractionResult> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => pdf::extract(path),
        "docx" => docx::extract(path),
        "doc" => Err(Error::validation(
            ".doc files are not supported, please convert to .docx",
            "file",
        )),
        "xlsx" | "xls" => sheet::extract_workbook(path),
        "csv" => sheet::extract_csv(path),
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" => image::extract(path),
        "txt" | "md" | "markdown" => text::extract(path),
        other => Err(Error::validation(
            format!(
                "Unsupported file type '.{}'. Supported: {}",
                other,
                FileExtractor::supported_extensions().join(", ")
            ),
            "file",
        )),
    }
}

/// Human-friendly title from a filename stem: extension stripped,
/// separators spaced, words capitalized.
pub(crate) fn title_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let spaced = stem.replace(['_', '-'], " ");
    let title = spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        "Untitled Document".to_string()
    } else {
        title
    }
}

static MULTI_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").expect("valid regex"));

/// Collapse runs of blank lines and per-line whitespace without
/// destroying paragraph breaks.
pub(crate) fn clean_extracted_text(text: &str) -> String {
    let normalized: String = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n");
    MULTI_BLANK.replace_all(&normalized, "\n\n").trim().to_string()
}

/// Wrap the file type's own content type onto a freshly built result.
pub(crate) fn build_result(
    path: &Path,
    title: Option<String>,
    text: String,
    content_type: ContentType,
) -> ExtractionResult {
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| title_from_path(path));
    let mut result = ExtractionResult::new(title, text);
    result.content_type = Some(content_type);
    result
}
