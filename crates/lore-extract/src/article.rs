//! Web article extraction.
//!
//! Fetches a page over HTTP and pulls the readable text plus metadata
//! out of the HTML. Parsing happens in a synchronous helper because the
//! parsed DOM is not `Send` and must never be held across an await.

use std::time::Duration;

use reqwest::Url;
use scraper::{Html, Selector};
use tracing::{debug, info};

use lore_core::{ContentType, Error, ExtractionResult, HubConfig, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_TITLE: &str = "Untitled Article";

/// Extracts readable text and metadata from web articles.
pub struct ArticleExtractor {
    client: reqwest::Client,
    min_chars: usize,
}

#[derive(Debug, Default)]
struct ParsedArticle {
    title: String,
    text: String,
    author: Option<String>,
    description: Option<String>,
    keywords: Vec<String>,
    published: Option<String>,
    image_urls: Vec<String>,
}

impl ArticleExtractor {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            min_chars: config.min_article_chars,
        }
    }

    /// Fetch and extract an article. Text shorter than the configured
    /// minimum is treated as a failed extraction, not a tiny article.
    pub async fn extract(&self, url: &str) -> Result<ExtractionResult> {
        debug!(
            subsystem = "extract",
            component = "article",
            op = "fetch",
            source_url = url,
            "Fetching article"
        );

        let response = self
            .client
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::api(format!("Failed to fetch article: {}", e), "Web"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                message: format!("Article fetch returned HTTP {}", status),
                source_name: "Web".to_string(),
                status: Some(status.as_u16()),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::api(format!("Failed to read article body: {}", e), "Web"))?;

        let parsed = parse_article(&html, url);

        if parsed.text.chars().count() < self.min_chars {
            return Err(Error::api(
                format!(
                    "Extracted article text too short ({} chars); page may be paywalled or script-rendered",
                    parsed.text.chars().count()
                ),
                "Web",
            ));
        }

        info!(
            subsystem = "extract",
            component = "article",
            op = "extract",
            source_url = url,
            text_len = parsed.text.len(),
            image_count = parsed.image_urls.len(),
            "Article extracted"
        );

        let mut result = ExtractionResult::new(parsed.title, parsed.text);
        result.content_type = Some(ContentType::Article);
        result.authors = parsed.author.into_iter().collect();
        result.description = parsed.description;
        result.keywords = parsed.keywords;
        result.published = parsed.published;
        result.image_urls = parsed.image_urls;
        Ok(result)
    }
}

fn selector(css: &str) -> Selector {
    // All selectors here are static literals; parsing cannot fail.
    Selector::parse(css).unwrap_or_else(|_| unreachable!("invalid static selector"))
}

fn meta_content(doc: &Html, css: &str) -> Option<String> {
    doc.select(&selector(css))
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_article(html: &str, base_url: &str) -> ParsedArticle {
    let doc = Html::parse_document(html);

    let title = meta_content(&doc, r#"meta[property="og:title"]"#)
        .or_else(|| {
            doc.select(&selector("title"))
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    // Prefer paragraphs inside <article>; fall back to all paragraphs.
    let article_paragraphs = selector("article p");
    let all_paragraphs = selector("p");
    let mut paragraphs: Vec<String> = doc
        .select(&article_paragraphs)
        .map(paragraph_text)
        .filter(|p| !p.is_empty())
        .collect();
    if paragraphs.is_empty() {
        paragraphs = doc
            .select(&all_paragraphs)
            .map(paragraph_text)
            .filter(|p| !p.is_empty())
            .collect();
    }
    let text = paragraphs.join("\n\n");

    let author = meta_content(&doc, r#"meta[name="author"]"#);
    let description = meta_content(&doc, r#"meta[name="description"]"#)
        .or_else(|| meta_content(&doc, r#"meta[property="og:description"]"#));
    let keywords = meta_content(&doc, r#"meta[name="keywords"]"#)
        .map(|k| {
            k.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let published = meta_content(&doc, r#"meta[property="article:published_time"]"#);

    let base = Url::parse(base_url).ok();
    let mut image_urls = Vec::new();
    for el in doc.select(&selector("img[src]")) {
        let Some(src) = el.value().attr("src") else {
            continue;
        };
        let resolved = match &base {
            Some(base) => base.join(src).map(|u| u.to_string()).ok(),
            None => Some(src.to_string()),
        };
        if let Some(url) = resolved {
            if url.starts_with("http") && !image_urls.contains(&url) {
                image_urls.push(url);
            }
        }
    }

    ParsedArticle {
        title,
        text,
        author,
        description,
        keywords,
        published,
        image_urls,
    }
}

fn paragraph_text(el: scraper::ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Fallback Title</title>
  <meta property="og:title" content="The Real Title">
  <meta name="author" content="Robin Writer">
  <meta name="description" content="A story about things.">
  <meta name="keywords" content="rust, parsing, web">
  <meta property="article:published_time" content="2025-03-01T10:00:00Z">
</head>
<body>
  <article>
    <p>First   paragraph with
    odd   spacing.</p>
    <p>Second paragraph.</p>
    <img src="/images/chart.png">
    <img src="https://cdn.example.com/photo.jpg">
    <img src="/images/chart.png">
  </article>
  <p>Footer boilerplate outside the article.</p>
</body>
</html>"#;

    #[test]
    fn test_parse_article_prefers_og_title_and_article_body() {
        let parsed = parse_article(SAMPLE_HTML, "https://example.com/post");
        assert_eq!(parsed.title, "The Real Title");
        assert_eq!(
            parsed.text,
            "First paragraph with odd spacing.\n\nSecond paragraph."
        );
        assert_eq!(parsed.author.as_deref(), Some("Robin Writer"));
        assert_eq!(parsed.description.as_deref(), Some("A story about things."));
        assert_eq!(parsed.keywords, vec!["rust", "parsing", "web"]);
        assert_eq!(
            parsed.published.as_deref(),
            Some("2025-03-01T10:00:00Z")
        );
    }

    #[test]
    fn test_parse_article_resolves_and_dedupes_images() {
        let parsed = parse_article(SAMPLE_HTML, "https://example.com/post");
        assert_eq!(
            parsed.image_urls,
            vec![
                "https://example.com/images/chart.png",
                "https://cdn.example.com/photo.jpg"
            ]
        );
    }

    #[test]
    fn test_parse_article_falls_back_to_title_tag_and_all_paragraphs() {
        let html = "<html><head><title>Only Title</title></head>\
                    <body><p>Loose paragraph.</p></body></html>";
        let parsed = parse_article(html, "https://example.com");
        assert_eq!(parsed.title, "Only Title");
        assert_eq!(parsed.text, "Loose paragraph.");
    }

    #[test]
    fn test_parse_article_default_title() {
        let parsed = parse_article("<html><body></body></html>", "https://example.com");
        assert_eq!(parsed.title, "Untitled Article");
        assert!(parsed.text.is_empty());
    }

    fn config_with_min(min_chars: usize) -> HubConfig {
        HubConfig {
            min_article_chars: min_chars,
            ..HubConfig::default()
        }
    }

    #[tokio::test]
    async fn test_extract_happy_path() {
        let server = MockServer::start().await;
        let long_paragraph = format!("<p>{}</p>", "A sentence of real content. ".repeat(20));
        let html = format!(
            "<html><head><title>Post</title></head><body><article>{}</article></body></html>",
            long_paragraph
        );
        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;

        let extractor = ArticleExtractor::new(&config_with_min(200));
        let result = extractor
            .extract(&format!("{}/post", server.uri()))
            .await
            .unwrap();

        assert_eq!(result.title, "Post");
        assert_eq!(result.content_type, Some(ContentType::Article));
        assert!(result.word_count > 0);
    }

    #[tokio::test]
    async fn test_extract_short_article_is_web_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thin"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>This article is barely there.</p></body></html>"),
            )
            .mount(&server)
            .await;

        let extractor = ArticleExtractor::new(&config_with_min(200));
        let err = extractor
            .extract(&format!("{}/thin", server.uri()))
            .await
            .unwrap_err();

        match err {
            Error::Api { source_name, .. } => assert_eq!(source_name, "Web"),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_http_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let extractor = ArticleExtractor::new(&config_with_min(200));
        let err = extractor
            .extract(&format!("{}/gone", server.uri()))
            .await
            .unwrap_err();

        match err {
            Error::Api {
                source_name,
                status,
                ..
            } => {
                assert_eq!(source_name, "Web");
                assert_eq!(status, Some(404));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }
}
