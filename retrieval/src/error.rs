//! Error types for the retrieval engine.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval engine.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The caller supplied a blank or whitespace-only query.
    #[error("query is empty")]
    EmptyQuery,

    /// The knowledge document could not be read.
    #[error("knowledge source {location} unavailable: {reason}")]
    MissingKnowledgeSource { location: String, reason: String },

    /// The embedding provider failed or returned unusable vectors.
    #[error("embedding error: {0}")]
    Embedding(#[from] kbqa_embeddings::EmbeddingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    ConfigFormat(#[from] toml::de::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
