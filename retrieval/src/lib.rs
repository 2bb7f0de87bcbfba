//! # Retrieval
//!
//! Selects the passages of a static knowledge document that belong in the
//! prompt for a user question.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  KnowledgeSource ──► segment ──► KnowledgeBase (Arc, read-only)  │
//! │                                        │                         │
//! │          ┌─────────────────────────────┴───────────┐             │
//! │          ▼                                         ▼             │
//! │  LexicalRetriever                        EmbeddingRetriever      │
//! │  tokenize ► TermFrequencyVector ► cos    EmbeddingProvider ► cos │
//! │          └───────────────┬─────────────────────────┘             │
//! │                          ▼                                       │
//! │               top-k ScoredChunk ──► PromptAssembler              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kbqa_retrieval::{RetrievalConfig, RetrievalEngine};
//!
//! let engine = RetrievalEngine::builder()
//!     .with_config(RetrievalConfig::new("knowledgebase.md"))
//!     .build()
//!     .await?;
//!
//! let prompt = engine.build_context("What does it cost?").await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod prompt;
pub mod rank;
pub mod retriever;
pub mod segment;
pub mod tokenizer;
pub mod vector;

pub use config::{EmbeddingConfig, RetrievalConfig, RetrieverStrategy};
pub use engine::{EngineStats, RetrievalEngine, RetrievalEngineBuilder};
pub use error::{Result, RetrievalError};
pub use knowledge::{FileSource, KnowledgeBase, KnowledgeChunk, KnowledgeSource};
pub use prompt::{PromptAssembler, PromptConfig, PromptContext};
pub use rank::ScoredChunk;
pub use retriever::{EmbeddingRetriever, LexicalRetriever, Retriever};
pub use segment::{split_passages, split_word_windows};
pub use tokenizer::tokenize;
pub use vector::TermFrequencyVector;

// Re-export from dependencies for convenience
pub use kbqa_embeddings::{EmbeddingProvider, VectorStore};
