//! # lore-core
//!
//! Core types, error taxonomy, and shared logic for the lorevault
//! knowledge hub. Every other lorevault crate depends on this one.

pub mod config;
pub mod error;
pub mod events;
pub mod filename;
pub mod keywords;
pub mod logging;
pub mod models;
pub mod relate;
pub mod retry;

// Re-export commonly used types at crate root
pub use config::HubConfig;
pub use error::{Error, ErrorKind, Result};
pub use events::{CancelFlag, EventBus, PipelineEvent, PipelineStage};
pub use filename::{sanitize_title, timestamp_fallback};
pub use models::*;
pub use relate::{find_related, relatedness, RelatedItem};
pub use retry::{retry_with_backoff, RetryPolicy};
