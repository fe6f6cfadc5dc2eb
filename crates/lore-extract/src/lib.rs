//! # lore-extract
//!
//! Content extractors for lorevault: web articles, videos (audio
//! download plus transcription), and local files (PDF, DOCX, XLSX, CSV,
//! image, text). Every extractor returns a
//! [`lore_core::ExtractionResult`] or a typed error.

pub mod article;
pub mod file;
pub mod images;
pub mod locator;
pub mod transcribe;
pub mod video;

pub use article::ArticleExtractor;
pub use file::FileExtractor;
pub use images::download_article_images;
pub use locator::{validate_url, Locator};
pub use transcribe::WhisperClient;
pub use video::VideoExtractor;
