//! Error types for vidmux
//!
//! This module provides the error taxonomy for the whole crate:
//! - Domain errors for each orchestration stage (validation, fetch, merge, cleanup)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::StreamKind;

/// Result type alias for vidmux operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for vidmux
///
/// Each variant maps to one outcome the HTTP surface can report. Variants carry
/// enough context to produce a useful structured log record.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "output_dir")
        key: Option<String>,
    },

    /// The submitted URL is empty or not on the allow-list
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The extractor could not find a stream matching the format selector
    #[error("format not found: {0}")]
    UnsupportedFormat(String),

    /// The extractor reported that the content does not exist
    #[error("content not found: {0}")]
    NotFound(String),

    /// The upstream site is rate limiting the extractor
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// A subprocess exited unsuccessfully or produced no output
    #[error("subprocess failure: {0}")]
    Subprocess(#[from] SubprocessError),

    /// The muxer failed to combine the fetched streams
    #[error("failed to merge video and audio into {output}: {reason}")]
    Merge {
        /// The final output path that could not be produced
        output: PathBuf,
        /// The reason the merge failed
        reason: String,
    },

    /// A temporary or expired file could not be removed
    #[error("failed to clean up {path}: {reason}")]
    Cleanup {
        /// The file that could not be deleted
        path: PathBuf,
        /// The reason deletion failed
        reason: String,
    },

    /// An external binary is not available
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// A fetched file did not carry a video media type
    #[error("downloaded file is not a video (content type: {content_type})")]
    UnexpectedMediaType {
        /// The media type the server declared
        content_type: String,
    },

    /// The server answered with an error body
    #[error("{message}")]
    Remote {
        /// HTTP status returned by the server
        status: u16,
        /// Machine-readable error code from the server
        code: String,
        /// Human-readable message from the server
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failures of an extractor invocation
#[derive(Debug, Error)]
pub enum SubprocessError {
    /// The process could not be started
    #[error("failed to execute {tool}: {reason}")]
    SpawnFailed {
        /// Name of the tool (e.g., "yt-dlp")
        tool: String,
        /// The reason the process could not be started
        reason: String,
    },

    /// The process exited with a non-zero status
    #[error("{tool} exited with {exit_code:?} while fetching {stream} stream: {stderr}")]
    NonZeroExit {
        /// Name of the tool (e.g., "yt-dlp")
        tool: String,
        /// Which stream was being fetched
        stream: StreamKind,
        /// The exit code, if the process was not killed by a signal
        exit_code: Option<i32>,
        /// Meaning of the exit code according to the tool's documentation
        meaning: Option<&'static str>,
        /// Trailing standard error output
        stderr: String,
    },

    /// The process did not finish in time and was killed
    #[error("{tool} timed out after {}s", timeout.as_secs())]
    TimedOut {
        /// Name of the tool (e.g., "yt-dlp")
        tool: String,
        /// The configured timeout
        timeout: Duration,
    },

    /// The extractor reported success but one of its outputs is absent
    #[error("failed to download necessary files: {missing:?}")]
    MissingFiles {
        /// The expected files that do not exist
        missing: Vec<PathBuf>,
    },
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "rate_limited",
///     "message": "Rate limit reached. Please try again later."
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorBody,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "invalid_input", "rate_limited")
    pub code: String,

    /// Human-readable error message, suitable for end users
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - user fixes the input
            Error::InvalidInput(_) => 400,
            Error::UnsupportedFormat(_) => 400,
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 429 Too Many Requests
            Error::RateLimited(_) => 429,

            // 500 Internal Server Error - generic failures at any stage
            Error::Subprocess(_) => 500,
            Error::Merge { .. } => 500,
            Error::Cleanup { .. } => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - upstream answered badly
            Error::Network(_) => 502,
            Error::UnexpectedMediaType { .. } => 502,
            Error::Remote { status, .. } => *status,

            // 503 Service Unavailable
            Error::ExternalTool(_) => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidInput(_) => "invalid_input",
            Error::UnsupportedFormat(_) => "format_not_found",
            Error::NotFound(_) => "not_found",
            Error::RateLimited(_) => "rate_limited",
            Error::Subprocess(e) => match e {
                SubprocessError::MissingFiles { .. } => "missing_files",
                SubprocessError::TimedOut { .. } => "subprocess_timeout",
                SubprocessError::SpawnFailed { .. } | SubprocessError::NonZeroExit { .. } => {
                    "subprocess_failure"
                }
            },
            Error::Merge { .. } => "merge_failure",
            Error::Cleanup { .. } => "cleanup_failure",
            Error::ExternalTool(_) => "external_tool_error",
            Error::UnexpectedMediaType { .. } => "unexpected_media_type",
            Error::Remote { code, .. } => code,
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl Error {
    /// Message shown to end users
    ///
    /// Internal details (paths, stderr) stay in the logs; clients get a stable,
    /// actionable sentence per error kind.
    pub fn public_message(&self) -> String {
        match self {
            Error::InvalidInput(msg) => msg.clone(),
            Error::UnsupportedFormat(_) => "Invalid URL or format not found".to_string(),
            Error::NotFound(_) => {
                "Content not found. The URL might be incorrect or the content is unavailable."
                    .to_string()
            }
            Error::RateLimited(_) => "Rate limit reached. Please try again later.".to_string(),
            Error::Subprocess(SubprocessError::MissingFiles { .. }) => {
                "Failed to download necessary files".to_string()
            }
            Error::Subprocess(_) => "Failed to download video or audio".to_string(),
            Error::Merge { .. } => "Failed to merge video and audio".to_string(),
            Error::Cleanup { .. } => "Failed to clean up temporary files".to_string(),
            Error::ExternalTool(_) => {
                "Download tooling is unavailable on the server. Please try again later.".to_string()
            }
            Error::Remote { message, .. } => message.clone(),
            _ => "Failed to process download request".to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.public_message();

        // Add contextual details for specific error types
        let details = match &error {
            Error::Subprocess(SubprocessError::NonZeroExit {
                stream,
                exit_code,
                meaning,
                ..
            }) => Some(serde_json::json!({
                "stream": stream,
                "exit_code": exit_code,
                "meaning": meaning,
            })),
            Error::Subprocess(SubprocessError::TimedOut { timeout, .. }) => {
                Some(serde_json::json!({
                    "timeout_secs": timeout.as_secs(),
                }))
            }
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorBody {
                code,
                message,
                details,
            },
        }
    }
}
