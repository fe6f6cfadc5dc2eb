//! Input routing: what the user handed us and which extractor owns it.

use std::path::PathBuf;

use reqwest::Url;

use lore_core::{Error, Result};

/// A piece of content to ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A web URL, already validated by [`validate_url`].
    Url(String),
    /// A local file path.
    File(PathBuf),
}

impl Locator {
    /// Build a URL locator, validating and normalizing the input.
    pub fn url(raw: &str) -> Result<Self> {
        Ok(Locator::Url(validate_url(raw)?))
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Locator::File(path.into())
    }

    /// Whether a URL locator points at a video host.
    pub fn is_video(&self) -> bool {
        match self {
            Locator::Url(url) => is_video_url(url),
            Locator::File(_) => false,
        }
    }

    /// User-facing source string recorded alongside the note.
    pub fn source(&self) -> String {
        match self {
            Locator::Url(url) => url.clone(),
            Locator::File(path) => path.display().to_string(),
        }
    }
}

/// Validate and normalize a user-supplied URL.
///
/// Trims whitespace, strips zero-width spaces and embedded spaces,
/// prepends `https://` when no scheme is present, and rejects input
/// that has no host.
pub fn validate_url(raw: &str) -> Result<String> {
    let mut url: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '\u{200b}' && *c != ' ')
        .collect();

    if url.is_empty() {
        return Err(Error::validation("URL cannot be empty", "url"));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("https://{}", url);
    }

    let parsed = Url::parse(&url)
        .map_err(|e| Error::validation(format!("Invalid URL: {}", e), "url"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::validation("URL has no host", "url"))?;

    let mut clean = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        clean.push(':');
        clean.push_str(&port.to_string());
    }
    clean.push_str(parsed.path());
    if let Some(query) = parsed.query() {
        clean.push('?');
        clean.push_str(query);
    }
    Ok(clean)
}

/// YouTube URLs route to the video extractor; everything else is
/// treated as an article.
pub fn is_video_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => {
                let host = host.strip_prefix("www.").unwrap_or(host);
                host == "youtube.com" || host == "youtu.be" || host.ends_with(".youtube.com")
            }
            None => false,
        },
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_prepends_https() {
        assert_eq!(
            validate_url("example.com/post").unwrap(),
            "https://example.com/post"
        );
    }

    #[test]
    fn test_validate_url_strips_zero_width_and_spaces() {
        assert_eq!(
            validate_url("  https://exa\u{200b}mple.com/a b  ").unwrap(),
            "https://example.com/ab"
        );
    }

    #[test]
    fn test_validate_url_preserves_query() {
        assert_eq!(
            validate_url("https://example.com/watch?v=abc&t=10").unwrap(),
            "https://example.com/watch?v=abc&t=10"
        );
    }

    #[test]
    fn test_validate_url_preserves_port() {
        assert_eq!(
            validate_url("http://localhost:8080/page").unwrap(),
            "http://localhost:8080/page"
        );
        assert_eq!(
            validate_url("localhost:3000/feed?x=1").unwrap(),
            "https://localhost:3000/feed?x=1"
        );
    }

    #[test]
    fn test_validate_url_rejects_empty() {
        let err = validate_url("   ").unwrap_err();
        assert!(matches!(err, Error::Validation { field: Some(f), .. } if f == "url"));
    }

    #[test]
    fn test_validate_url_rejects_hostless() {
        assert!(validate_url("https:///nope").is_err());
    }

    #[test]
    fn test_video_url_detection() {
        assert!(is_video_url("https://www.youtube.com/watch?v=abc"));
        assert!(is_video_url("https://youtu.be/abc"));
        assert!(is_video_url("https://m.youtube.com/watch?v=abc"));
        assert!(!is_video_url("https://example.com/youtube.com"));
        assert!(!is_video_url("https://vimeo.com/123"));
    }

    #[test]
    fn test_locator_routing() {
        let video = Locator::url("https://youtu.be/abc").unwrap();
        assert!(video.is_video());

        let article = Locator::url("https://example.com/post").unwrap();
        assert!(!article.is_video());

        let file = Locator::file("/tmp/report.pdf");
        assert!(!file.is_video());
        assert_eq!(file.source(), "/tmp/report.pdf");
    }
}
