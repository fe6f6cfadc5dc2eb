//! Structured logging field name constants for lorevault.
//!
//! All crates use these constants for consistent structured logging
//! fields so log queries work the same across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed and is surfaced to the user |
//! | WARN  | Recoverable issue, fallback or skip applied |
//! | INFO  | Lifecycle events, pipeline stage completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration (images, sheets, rows) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "extract", "inference", "db", "pipeline", "cli"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "article", "video", "openai", "writer", "store"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "fetch", "transcribe", "summarize", "write_note"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Source URL being processed.
pub const SOURCE_URL: &str = "source_url";

/// Local file being processed.
pub const FILE_PATH: &str = "file_path";

/// Database row id of a content item.
pub const CONTENT_ID: &str = "content_id";

/// Content type enum variant.
pub const CONTENT_TYPE: &str = "content_type";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Extracted text length in characters.
pub const TEXT_LEN: &str = "text_len";

/// Word count of extracted text.
pub const WORD_COUNT: &str = "word_count";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of images downloaded.
pub const IMAGE_COUNT: &str = "image_count";

/// Byte length of a prompt sent to the model.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for summarization or transcription.
pub const MODEL: &str = "model";

/// Summarization backend name ("openai", "mock").
pub const BACKEND: &str = "backend";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
