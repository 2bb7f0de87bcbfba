//! # Embeddings
//!
//! Dense-vector support for knowledge-base retrieval.
//!
//! - **Providers**: turn a query into a dense vector via an external model
//! - **Similarity**: cosine similarity and stable ranking over dense vectors
//! - **Vector stores**: passages embedded ahead of time and loaded at startup
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  EmbeddingProvider ──► Embedding ──► similarity::rank     │
//! │                                          ▲                │
//! │                        VectorStore ──────┘                │
//! └───────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod provider;
pub mod similarity;
pub mod store;

pub use error::{EmbeddingError, Result};
pub use provider::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, OpenAIProvider};
pub use similarity::cosine_similarity;
pub use store::{VectorStore, VectorStoreEntry};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
