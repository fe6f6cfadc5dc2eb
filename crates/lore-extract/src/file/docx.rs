//! DOCX text extraction.
//!
//! A .docx file is a zip archive; the body lives in `word/document.xml`
//! as `<w:t>` text runs grouped into paragraphs, and author/title
//! metadata in `docProps/core.xml`. No full XML parse is needed for
//! either, text runs never nest.

use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use lore_core::{ContentType, Error, ExtractionResult, Result};

use super::{build_result, clean_extracted_text};

static TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<w:t[^>]*>([^<]*)</w:t>").expect("valid regex"));
static TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:tbl>.*?</w:tbl>").expect("valid regex"));
static TABLE_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:tr[ >].*?</w:tr>").expect("valid regex"));
static TABLE_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:tc[ >].*?</w:tc>").expect("valid regex"));

pub(super) fn extract(path: &Path) -> Result<ExtractionResult> {
    let file = std::fs::File::open(path).map_err(|e| {
        Error::filesystem(
            format!("Cannot open {}: {}", path.display(), e),
            "Check the file path and permissions.",
        )
    })?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::validation(format!("Document processing error: {}", e), "file"))?;

    let document_xml = read_archive_file(&mut archive, "word/document.xml")?
        .ok_or_else(|| Error::validation("Document has no body", "file"))?;
    let core_xml = read_archive_file(&mut archive, "docProps/core.xml")?.unwrap_or_default();

    let mut content = paragraphs_text(&TABLE.replace_all(&document_xml, ""));
    for table in TABLE.find_iter(&document_xml) {
        let table_text = table_text(table.as_str());
        if !table_text.is_empty() {
            content.push_str("\n\n--- Table ---\n\n");
            content.push_str(&table_text);
        }
    }
    let content = clean_extracted_text(&content);

    let author = core_property(&core_xml, "dc:creator");
    let doc_title = core_property(&core_xml, "dc:title");
    let keywords = core_property(&core_xml, "cp:keywords")
        .map(|k| {
            k.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut result = build_result(path, doc_title, content, ContentType::Document);
    result.authors = author.into_iter().collect();
    result.keywords = keywords;
    Ok(result)
}

fn read_archive_file<R: Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut xml = String::new();
            entry
                .read_to_string(&mut xml)
                .map_err(|e| Error::validation(format!("Document processing error: {}", e), "file"))?;
            Ok(Some(xml))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(Error::validation(
            format!("Document processing error: {}", e),
            "file",
        )),
    }
}

fn paragraphs_text(xml: &str) -> String {
    xml.split("</w:p>")
        .map(runs_text)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn table_text(table_xml: &str) -> String {
    TABLE_ROW
        .find_iter(table_xml)
        .map(|row| {
            TABLE_CELL
                .find_iter(row.as_str())
                .map(|cell| runs_text(cell.as_str()))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .filter(|row| !row.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn runs_text(xml: &str) -> String {
    TEXT_RUN
        .captures_iter(xml)
        .map(|cap| unescape(&cap[1]))
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string()
}

fn core_property(core_xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let start = core_xml.find(&open)?;
    let rest = &core_xml[start..];
    let content_start = rest.find('>')? + 1;
    let content_end = rest.find(&close)?;
    if content_end <= content_start {
        return None;
    }
    let value = unescape(rest[content_start..content_end].trim());
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
