//! Error types for completion gateways.

use thiserror::Error;

/// Result type alias for completion operations.
pub type Result<T> = std::result::Result<T, CompletionError>;

/// Errors that can occur while asking a model for an answer.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// Gateway not configured (usually a missing API key).
    #[error("completion gateway not configured: {0}")]
    NotConfigured(String),

    /// The completion API answered with a non-success status.
    #[error("completion API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The completion API answered, but not in the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
