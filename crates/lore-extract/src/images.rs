//! Article image side-channel.
//!
//! Downloads up to a handful of images referenced by an article into a
//! directory next to the note. A failing image is logged and skipped;
//! image downloads never fail the pipeline.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use lore_core::{sanitize_title, Error, Result, SavedImage};

const IMAGE_TIMEOUT: Duration = Duration::from_secs(20);

/// Download up to `max_images` article images into
/// `{sanitized_title}_images/` under the vault. Each image is streamed
/// to disk and abandoned if it exceeds `max_bytes`.
pub async fn download_article_images(
    client: &reqwest::Client,
    image_urls: &[String],
    title: &str,
    vault_dir: &Path,
    max_images: usize,
    max_bytes: u64,
) -> Result<Vec<SavedImage>> {
    if image_urls.is_empty() {
        return Ok(Vec::new());
    }

    let dir = vault_dir.join(format!("{}_images", sanitize_title(title)));
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        Error::filesystem(
            format!("Cannot create image directory {}: {}", dir.display(), e),
            "Check that the vault directory is writable.",
        )
    })?;

    let mut saved = Vec::new();
    for (index, url) in image_urls.iter().take(max_images).enumerate() {
        match download_one(client, url, &dir, index + 1, max_bytes).await {
            Ok(image) => saved.push(image),
            Err(e) => {
                warn!(
                    subsystem = "extract",
                    component = "images",
                    source_url = %url,
                    error = %e,
                    "Skipping article image"
                );
            }
        }
    }

    debug!(
        subsystem = "extract",
        component = "images",
        op = "download",
        image_count = saved.len(),
        "Article images saved"
    );
    Ok(saved)
}

async fn download_one(
    client: &reqwest::Client,
    url: &str,
    dir: &Path,
    index: usize,
    max_bytes: u64,
) -> Result<SavedImage> {
    let response = client
        .get(url)
        .timeout(IMAGE_TIMEOUT)
        .send()
        .await
        .map_err(|e| Error::api(format!("Image fetch failed: {}", e), "Web"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Api {
            message: format!("Image fetch returned HTTP {}", status),
            source_name: "Web".to_string(),
            status: Some(status.as_u16()),
        });
    }

    // Reject early when the server declares an oversized body.
    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(Error::api(
                format!("Image is {} bytes, over the {} byte limit", len, max_bytes),
                "Web",
            ));
        }
    }

    let ext = extension_for(response.headers());
    let filename = format!("image_{}{}", index, ext);
    let path = dir.join(&filename);

    let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
        Error::filesystem(
            format!("Cannot create image file {}: {}", path.display(), e),
            "Check that the vault directory is writable.",
        )
    })?;

    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| Error::api(format!("Image download interrupted: {}", e), "Web"))?;
        written += chunk.len() as u64;
        if written > max_bytes {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(Error::api(
                format!("Image exceeded the {} byte limit while streaming", max_bytes),
                "Web",
            ));
        }
        file.write_all(&chunk).await.map_err(|e| {
            Error::filesystem(
                format!("Cannot write image file {}: {}", path.display(), e),
                "Check available disk space.",
            )
        })?;
    }
    file.flush().await.map_err(|e| {
        Error::filesystem(
            format!("Cannot flush image file {}: {}", path.display(), e),
            "Check available disk space.",
        )
    })?;

    Ok(SavedImage {
        filename,
        path: path.display().to_string(),
        origin_url: url.to_string(),
    })
}

fn extension_for(headers: &reqwest::header::HeaderMap) -> &'static str {
    let content_type = headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    match content_type.split(';').next().unwrap_or("").trim() {
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        "image/bmp" => ".bmp",
        _ => ".jpg",
    }
}
