//! Retrieval strategies.
//!
//! Both strategies rank the same immutable [`KnowledgeBase`] and return the
//! best `k` chunks. Which one serves requests is fixed by configuration.

use std::sync::Arc;

use async_trait::async_trait;
use kbqa_embeddings::{EmbeddingError, EmbeddingProvider, EmbeddingRequest, similarity};
use tracing::debug;

use crate::config::RetrieverStrategy;
use crate::error::{Result, RetrievalError};
use crate::knowledge::KnowledgeBase;
use crate::rank::{ScoredChunk, rank_lexical, top_k};
use crate::vector::TermFrequencyVector;

/// Ranks knowledge chunks against a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Which strategy this retriever implements.
    fn strategy(&self) -> RetrieverStrategy;

    /// The chunks this retriever ranks.
    fn knowledge(&self) -> &KnowledgeBase;

    /// Return the `min(k, chunks)` best chunks for `query`, best first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>>;
}

/// Reject blank queries before any ranking happens.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(RetrievalError::EmptyQuery);
    }
    Ok(trimmed)
}

/// Term-frequency cosine similarity over the chunk texts.
pub struct LexicalRetriever {
    knowledge: Arc<KnowledgeBase>,
}

impl LexicalRetriever {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Synchronous ranking; the lexical strategy never suspends.
    pub fn rank(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let query = validate_query(query)?;
        let query_terms = TermFrequencyVector::from_text(query);
        let ranked = rank_lexical(&query_terms, &self.knowledge);
        Ok(top_k(&self.knowledge, ranked, k))
    }
}

#[async_trait]
impl Retriever for LexicalRetriever {
    fn strategy(&self) -> RetrieverStrategy {
        RetrieverStrategy::Lexical
    }

    fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        self.rank(query, k)
    }
}

/// Dense cosine similarity between a query embedding and precomputed chunk
/// embeddings.
pub struct EmbeddingRetriever {
    knowledge: Arc<KnowledgeBase>,
    provider: Arc<dyn EmbeddingProvider>,
    model: Option<String>,
    dimension: usize,
}

impl EmbeddingRetriever {
    /// Every chunk must carry an embedding of the same dimension.
    pub fn new(knowledge: Arc<KnowledgeBase>, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let dimension = if knowledge.is_empty() {
            0
        } else {
            knowledge.embedding_dimension().ok_or_else(|| {
                RetrievalError::Config(
                    "embedding retrieval needs a precomputed embedding for every chunk".to_string(),
                )
            })?
        };

        Ok(Self {
            knowledge,
            provider,
            model: None,
            dimension,
        })
    }

    /// Ask the provider for a specific model instead of its default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut request = EmbeddingRequest::new(query);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        let response = self.provider.embed(request).await?;
        if response.embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: response.embedding.len(),
            }
            .into());
        }
        Ok(response.embedding)
    }
}

#[async_trait]
impl Retriever for EmbeddingRetriever {
    fn strategy(&self) -> RetrieverStrategy {
        RetrieverStrategy::Embedding
    }

    fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let query = validate_query(query)?;
        if self.knowledge.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embed_query(query).await?;
        debug!(
            "Ranking {} chunks with {} query embedding",
            self.knowledge.len(),
            self.provider.name()
        );

        let ranked = similarity::rank(
            &query_embedding,
            self.knowledge
                .chunks()
                .iter()
                .map(|chunk| chunk.embedding().unwrap_or_default()),
        )?;
        Ok(top_k(&self.knowledge, ranked, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbqa_embeddings::{EmbeddingResponse, VectorStore, VectorStoreEntry};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn lexical(passages: &[&str]) -> LexicalRetriever {
        LexicalRetriever::new(Arc::new(KnowledgeBase::from_passages(
            passages.iter().copied(),
        )))
    }

    /// Returns a fixed embedding and counts calls.
    struct FixedProvider {
        embedding: Vec<f32>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new(embedding: Vec<f32>) -> Arc<Self> {
            Arc::new(Self {
                embedding,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn default_model(&self) -> &str {
            "fixed"
        }

        async fn embed(
            &self,
            _request: EmbeddingRequest,
        ) -> kbqa_embeddings::Result<EmbeddingResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EmbeddingResponse {
                embedding: self.embedding.clone(),
                model: "fixed".to_string(),
                dimension: self.embedding.len(),
                tokens_used: None,
            })
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    struct DownProvider;

    #[async_trait]
    impl EmbeddingProvider for DownProvider {
        fn name(&self) -> &str {
            "down"
        }

        fn default_model(&self) -> &str {
            "down"
        }

        async fn embed(
            &self,
            _request: EmbeddingRequest,
        ) -> kbqa_embeddings::Result<EmbeddingResponse> {
            Err(EmbeddingError::ProviderNotConfigured)
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    fn dense_kb() -> Arc<KnowledgeBase> {
        let store = VectorStore::new(vec![
            VectorStoreEntry {
                text: "north".to_string(),
                embedding: vec![0.0, 1.0],
            },
            VectorStoreEntry {
                text: "east".to_string(),
                embedding: vec![1.0, 0.0],
            },
            VectorStoreEntry {
                text: "north-east".to_string(),
                embedding: vec![0.7, 0.7],
            },
        ])
        .unwrap();
        Arc::new(KnowledgeBase::from_vector_store(store))
    }

    #[tokio::test]
    async fn test_lexical_returns_min_of_k_and_chunks() {
        let retriever = lexical(&["alpha", "beta", "gamma"]);

        assert_eq!(retriever.retrieve("alpha", 2).await.unwrap().len(), 2);
        assert_eq!(retriever.retrieve("alpha", 10).await.unwrap().len(), 3);
        assert_eq!(retriever.retrieve("alpha", 0).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_lexical_is_idempotent() {
        let retriever = lexical(&[
            "Refunds are processed within 14 days.",
            "Contact support for refunds.",
            "The product ships worldwide.",
        ]);

        let first = retriever.retrieve("how do refunds work", 3).await.unwrap();
        let second = retriever.retrieve("how do refunds work", 3).await.unwrap();
        assert_eq!(first, second);
        assert!(first[0].text.contains("efunds"));
    }

    #[tokio::test]
    async fn test_lexical_over_empty_knowledge_base() {
        let retriever = LexicalRetriever::new(Arc::new(KnowledgeBase::empty()));
        assert!(retriever.retrieve("anything", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let retriever = lexical(&["alpha"]);
        assert!(matches!(
            retriever.retrieve("  \n", 3).await,
            Err(RetrievalError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_embedding_ranks_by_dense_similarity() {
        let provider = FixedProvider::new(vec![1.0, 0.1]);
        let retriever = EmbeddingRetriever::new(dense_kb(), provider.clone()).unwrap();

        let results = retriever.retrieve("which way?", 2).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();

        assert_eq!(texts, vec!["east", "north-east"]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_embedding_provider_failure_propagates() {
        let retriever = EmbeddingRetriever::new(dense_kb(), Arc::new(DownProvider)).unwrap();
        assert!(matches!(
            retriever.retrieve("q", 2).await,
            Err(RetrievalError::Embedding(
                EmbeddingError::ProviderNotConfigured
            ))
        ));
    }

    #[tokio::test]
    async fn test_embedding_dimension_mismatch_fails() {
        let provider = FixedProvider::new(vec![1.0, 0.0, 0.0]);
        let retriever = EmbeddingRetriever::new(dense_kb(), provider).unwrap();
        assert!(matches!(
            retriever.retrieve("q", 2).await,
            Err(RetrievalError::Embedding(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            }))
        ));
    }

    #[test]
    fn test_embedding_requires_precomputed_vectors() {
        let kb = Arc::new(KnowledgeBase::from_passages(["no vectors here"]));
        assert!(matches!(
            EmbeddingRetriever::new(kb, FixedProvider::new(vec![1.0])),
            Err(RetrievalError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_embedding_over_empty_store_skips_provider() {
        let provider = FixedProvider::new(vec![1.0]);
        let retriever =
            EmbeddingRetriever::new(Arc::new(KnowledgeBase::empty()), provider.clone()).unwrap();

        assert!(retriever.retrieve("q", 3).await.unwrap().is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
