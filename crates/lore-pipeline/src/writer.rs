//! Markdown note rendering and collision-safe persistence.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use lore_core::config::MarkdownTemplates;
use lore_core::{sanitize_title, Error, ExtractionResult, HubConfig, Result, SavedImage};

/// Optional metadata rendered between the note header and body.
#[derive(Debug, Clone, Default)]
pub struct NoteMetadata {
    pub authors: Vec<String>,
    pub published: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

impl NoteMetadata {
    /// Carry over whatever the extractor found. Returns `None` when
    /// there is nothing to render.
    pub fn from_extraction(extraction: &ExtractionResult) -> Option<Self> {
        let metadata = Self {
            authors: extraction.authors.clone(),
            published: extraction.published.clone(),
            description: extraction.description.clone(),
            keywords: extraction.keywords.clone(),
        };
        if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        }
    }

    fn is_empty(&self) -> bool {
        self.authors.is_empty()
            && self.published.is_none()
            && self.description.is_none()
            && self.keywords.is_empty()
    }
}

/// Renders summaries into vault Markdown files.
pub struct NoteWriter {
    vault_dir: PathBuf,
    templates: MarkdownTemplates,
    date_format: String,
    filename_template: String,
}

impl NoteWriter {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            vault_dir: config.vault_dir(),
            templates: config.markdown_template.clone(),
            date_format: config.date_format.clone(),
            filename_template: config.filename_template.clone(),
        }
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    /// Render and write one note. Returns the path of the file written.
    /// An existing file with the same name is never overwritten; the
    /// new note gets a `_1`, `_2`, ... suffix instead.
    pub fn write_note(
        &self,
        markdown: &str,
        title: &str,
        source_url: Option<&str>,
        images: &[SavedImage],
        metadata: Option<&NoteMetadata>,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.vault_dir).map_err(|e| {
            Error::filesystem(
                format!(
                    "Cannot create vault directory {}: {}",
                    self.vault_dir.display(),
                    e
                ),
                "Check the vault path and directory permissions.",
            )
        })?;

        let path = self.available_path(&sanitize_title(title));
        let document = self.render(markdown, title, source_url, images, metadata);

        std::fs::write(&path, document).map_err(|e| {
            Error::filesystem(
                format!("Cannot write note {}: {}", path.display(), e),
                "Check vault directory permissions and free disk space.",
            )
        })?;

        info!(
            subsystem = "pipeline",
            component = "writer",
            op = "write_note",
            file_path = %path.display(),
            image_count = images.len(),
            "Note written"
        );
        Ok(path)
    }

    fn render(
        &self,
        markdown: &str,
        title: &str,
        source_url: Option<&str>,
        images: &[SavedImage],
        metadata: Option<&NoteMetadata>,
    ) -> String {
        let timestamp = Local::now().format(&self.date_format).to_string();
        let mut document = self
            .templates
            .header
            .replace("{title}", title)
            .replace("{url}", source_url.unwrap_or("N/A"))
            .replace("{timestamp}", &timestamp);

        if let Some(metadata) = metadata {
            document.push_str(&render_metadata(metadata));
        }

        document.push_str(&self.templates.content.replace("{content}", markdown));

        if !images.is_empty() {
            document.push_str("\n## Images\n\n");
            for image in images {
                let link = Path::new(&image.path)
                    .strip_prefix(&self.vault_dir)
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| image.path.clone());
                document.push_str(&format!("![{}]({})\n", image.filename, link));
            }
        }

        document
    }

    /// First unused path for the sanitized title under the vault.
    fn available_path(&self, safe_title: &str) -> PathBuf {
        let filename = self.filename_template.replace("{title}", safe_title);
        let name = Path::new(&filename);
        let stem = name
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| safe_title.to_string());
        let ext = name
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "md".to_string());

        let mut candidate = self.vault_dir.join(format!("{}.{}", stem, ext));
        let mut counter = 1;
        while candidate.exists() {
            candidate = self.vault_dir.join(format!("{}_{}.{}", stem, counter, ext));
            counter += 1;
        }
        candidate
    }
}

fn render_metadata(metadata: &NoteMetadata) -> String {
    let mut block = String::new();
    if !metadata.authors.is_empty() {
        block.push_str(&format!("**Author(s):** {}\n", metadata.authors.join(", ")));
    }
    if let Some(published) = &metadata.published {
        block.push_str(&format!("**Published:** {}\n", published));
    }
    if let Some(description) = &metadata.description {
        block.push_str(&format!("**Description:** {}\n", description));
    }
    if !metadata.keywords.is_empty() {
        block.push_str(&format!("**Keywords:** {}\n", metadata.keywords.join(", ")));
    }
    if block.is_empty() {
        block
    } else {
        format!("{}\n", block)
    }
}
