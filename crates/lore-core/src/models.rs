//! Core data models for lorevault.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Content
// ============================================================================

/// The kind of source an item was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Article,
    Video,
    Pdf,
    Document,
    Spreadsheet,
    Image,
    Text,
    RssArticle,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Video => "video",
            ContentType::Pdf => "pdf",
            ContentType::Document => "document",
            ContentType::Spreadsheet => "spreadsheet",
            ContentType::Image => "image",
            ContentType::Text => "text",
            ContentType::RssArticle => "rss_article",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(ContentType::Article),
            "video" => Ok(ContentType::Video),
            "pdf" => Ok(ContentType::Pdf),
            "document" => Ok(ContentType::Document),
            "spreadsheet" => Ok(ContentType::Spreadsheet),
            "image" => Ok(ContentType::Image),
            "text" => Ok(ContentType::Text),
            "rss_article" => Ok(ContentType::RssArticle),
            other => Err(Error::validation(
                format!("Unknown content type: {}", other),
                "content_type",
            )),
        }
    }
}

/// A stored content item, as persisted in the metadata database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    /// Absolute path of the generated note. Unique per vault.
    pub file_path: String,
    pub title: String,
    pub content_type: ContentType,
    pub source_url: Option<String>,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Normalized tags: lowercased, trimmed, deduplicated, order preserved.
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub key_takeaways: Option<String>,
    pub author: Option<String>,
    pub word_count: i64,
    pub status: String,
}

/// Fields for inserting or replacing a content row. The store assigns
/// `id` and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContent {
    pub file_path: String,
    pub title: String,
    pub content_type: ContentType,
    pub source_url: Option<String>,
    pub file_size: i64,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub key_takeaways: Option<String>,
    pub author: Option<String>,
    pub word_count: i64,
}

impl NewContent {
    pub fn new(
        file_path: impl Into<String>,
        title: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            title: title.into(),
            content_type,
            source_url: None,
            file_size: 0,
            tags: Vec::new(),
            summary: None,
            key_takeaways: None,
            author: None,
            word_count: 0,
        }
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Transient output of a content extractor, consumed by the summarization
/// and note-writing stages. Never persisted as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub text: String,
    pub content_type: Option<ContentType>,
    pub authors: Vec<String>,
    pub published: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub image_urls: Vec<String>,
    pub word_count: usize,
}

impl ExtractionResult {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self {
            title: title.into(),
            text,
            word_count,
            ..Default::default()
        }
    }
}

/// An article image downloaded into the vault alongside its note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedImage {
    pub filename: String,
    /// Absolute path on disk.
    pub path: String,
    pub origin_url: String,
}

// ============================================================================
// Tags, preferences, statistics
// ============================================================================

/// A tag name with its current usage count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub usage_count: i64,
}

/// A stored key/value preference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preference {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate library statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentStats {
    pub total_items: i64,
    /// (content type, count), ordered by count descending.
    pub by_type: Vec<(String, i64)>,
    /// (ISO date, count) for the last 30 days, newest first.
    pub by_day: Vec<(String, i64)>,
    /// Top tags by usage, at most 20.
    pub top_tags: Vec<TagCount>,
}

/// Normalize a raw tag list: trim, lowercase, drop empties, deduplicate
/// while preserving first-seen order.
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for tag in raw {
        let t = tag.as_ref().trim().to_lowercase();
        if t.is_empty() {
            continue;
        }
        if seen.insert(t.clone()) {
            out.push(t);
        }
    }
    out
}
