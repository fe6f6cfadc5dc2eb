//! Error types for lorevault.
//!
//! Every outward-facing operation fails with one of three user-visible
//! kinds: Validation (bad input, never retried), Api (a named external
//! dependency failed, retryable), or Filesystem (local I/O failed,
//! surfaced immediately). Infrastructure variants fold into those kinds
//! via [`Error::kind`].

use thiserror::Error;

/// Result type alias using lorevault's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// User-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input is malformed; the user must correct it.
    Validation,
    /// A named external dependency failed; retryable by default.
    Api,
    /// Local I/O failed; surfaced immediately, never auto-retried.
    Filesystem,
}

/// Core error type for lorevault operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller input is malformed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        /// The input field at fault, when known (e.g. "url", "file").
        field: Option<String>,
    },

    /// A named external dependency failed.
    #[error("{source_name} error: {message}")]
    Api {
        message: String,
        /// Dependency name: "Web", "YouTube", "OpenAI", "Whisper".
        source_name: String,
        status: Option<u16>,
    },

    /// Local filesystem operation failed.
    #[error("Filesystem error: {message}")]
    Filesystem { message: String, remedy: String },

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Pipeline run was cancelled between stages.
    #[error("Operation cancelled")]
    Cancelled,

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convenience constructor for a validation error with a field name.
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Convenience constructor for an API error without a status code.
    pub fn api(message: impl Into<String>, source_name: impl Into<String>) -> Self {
        Error::Api {
            message: message.into(),
            source_name: source_name.into(),
            status: None,
        }
    }

    /// Convenience constructor for a filesystem error with a remedy hint.
    pub fn filesystem(message: impl Into<String>, remedy: impl Into<String>) -> Self {
        Error::Filesystem {
            message: message.into(),
            remedy: remedy.into(),
        }
    }

    /// Classify this error into the three user-facing kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } | Error::Config(_) | Error::Cancelled => {
                ErrorKind::Validation
            }
            Error::Api { .. } | Error::Request(_) | Error::Serialization(_) => ErrorKind::Api,
            Error::Filesystem { .. }
            | Error::Database(_)
            | Error::Io(_)
            | Error::NotFound(_) => ErrorKind::Filesystem,
        }
    }

    /// Whether the retry wrapper may re-attempt the failed operation.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Api
    }

    /// Suggested user action for rendering alongside the error message.
    pub fn suggested_action(&self) -> String {
        match self {
            Error::Validation { field, .. } => match field {
                Some(f) => format!("Please correct the {} field.", f),
                None => "Please check your input.".to_string(),
            },
            Error::Api {
                source_name,
                status,
                ..
            } => match (source_name.as_str(), status) {
                ("OpenAI", Some(401)) => {
                    "Please check your OpenAI API key in the configuration.".to_string()
                }
                ("OpenAI", Some(429)) => {
                    "Rate limit reached. Please wait a moment and try again.".to_string()
                }
                ("OpenAI", Some(s)) if *s >= 500 => {
                    "OpenAI service is temporarily unavailable. Please try again later."
                        .to_string()
                }
                ("YouTube", _) => {
                    "Failed to download YouTube content. Please verify the URL is correct and accessible."
                        .to_string()
                }
                ("Web", _) => {
                    "Failed to access the website. Please check the URL and your internet connection."
                        .to_string()
                }
                _ => "Please check your internet connection and try again.".to_string(),
            },
            Error::Filesystem { remedy, .. } => remedy.clone(),
            Error::Cancelled => "The operation was cancelled.".to_string(),
            _ => "Please check your internet connection and try again.".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
