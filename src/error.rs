use crate::transport::{TransportError, TransportErrorKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Structured error context for configuration problems.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Configuration key that caused the error (e.g., "config.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected range, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_validator", "client_builder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Structured error payload returned by the backend inside `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

/// Wire shape of a non-2xx response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ApiError,
}

/// Unified error type returned by every client operation.
///
/// Values are facts about what happened; whether a failure is worth retrying is
/// decided by the retry policy, not stored here.
#[derive(Debug, Error)]
pub enum Error {
    /// No HTTP response reached the caller.
    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-2xx response without a decodable error body.
    #[error("HTTP error with status code: {status}")]
    HttpStatus { status: u16 },

    /// Non-2xx response carrying a structured `{code, message}` error.
    #[error("API error {}: {}", .0.code, .0.message)]
    Api(ApiError),

    /// A 2xx response whose body did not match the expected success schema.
    #[error("Failed to decode response: {0}")]
    DecodingFailed(#[source] serde_json::Error),

    #[error("File not found at: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("File is too large ({size} bytes). Maximum size is {max_size} bytes")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Invalid file type. Expected {expected}, but got {actual}")]
    InvalidFileType { expected: String, actual: String },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

const MIB: f64 = 1_048_576.0;

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Status or API error code of the terminal response.
    ///
    /// `HttpStatus` yields the HTTP status. `Api` yields the server's application
    /// `code`, which the backend usually sets to the HTTP status but is not
    /// guaranteed to be one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status } => Some(*status),
            Error::Api(api) => u16::try_from(api.code).ok(),
            _ => None,
        }
    }

    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Error::Transport(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// True for failures detected locally before any network I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound { .. } | Error::FileTooLarge { .. } | Error::InvalidFileType { .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.transport_kind() == Some(TransportErrorKind::Cancelled)
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Text suitable for showing to an end user.
    ///
    /// Server-provided messages are passed through; everything else maps to a
    /// generic, non-technical fallback.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api(api) => api.message.clone(),
            Error::Transport(e) => match e.kind() {
                TransportErrorKind::Timeout => {
                    "The request timed out. Please check your connection and try again".into()
                }
                TransportErrorKind::NoConnection => {
                    "No internet connection. Please check your network settings".into()
                }
                TransportErrorKind::Cancelled => "The request was cancelled".into(),
                _ => "Could not reach the server. Please try again later".into(),
            },
            Error::HttpStatus { .. } | Error::DecodingFailed(_) => {
                "Something went wrong. Please try again later".into()
            }
            Error::FileNotFound { .. } => "The recording could not be found".into(),
            Error::FileTooLarge { size, max_size } => format!(
                "File is too large ({:.1} MB). Maximum size is {:.1} MB",
                *size as f64 / MIB,
                *max_size as f64 / MIB
            ),
            Error::InvalidFileType { expected, actual } => {
                format!("Invalid file type. Expected {}, but got {}", expected, actual)
            }
            Error::Configuration { .. } => "The app is misconfigured".into(),
        }
    }
}
