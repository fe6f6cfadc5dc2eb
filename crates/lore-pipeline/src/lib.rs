//! # lore-pipeline
//!
//! Ingestion pipeline for the lorevault knowledge hub: extract,
//! summarize, write the Markdown note, record metadata. Publishes
//! progress events and honors cooperative cancellation.

pub mod hub;
pub mod note;
pub mod writer;

pub use hub::{Hub, ProcessedNote};
pub use note::{parse_sections, NoteSections};
pub use writer::{NoteMetadata, NoteWriter};
