//! Retrieval engine: strategy selection plus prompt assembly.

use std::sync::Arc;
use std::time::Duration;

use kbqa_embeddings::{EmbeddingProvider, OpenAIProvider};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{RetrievalConfig, RetrieverStrategy};
use crate::error::Result;
use crate::knowledge::{FileSource, KnowledgeBase};
use crate::prompt::{PromptAssembler, PromptConfig, PromptContext};
use crate::rank::ScoredChunk;
use crate::retriever::{EmbeddingRetriever, LexicalRetriever, Retriever, validate_query};

/// Answers "which passages belong in the prompt for this question".
///
/// Holds the configured retriever over an immutable knowledge base, so one
/// engine can be shared by every request of the process.
pub struct RetrievalEngine {
    retriever: Arc<dyn Retriever>,
    assembler: PromptAssembler,
    top_k: usize,
}

impl RetrievalEngine {
    /// Create a new retrieval engine builder.
    pub fn builder() -> RetrievalEngineBuilder {
        RetrievalEngineBuilder::new()
    }

    pub fn new(retriever: Arc<dyn Retriever>, assembler: PromptAssembler, top_k: usize) -> Self {
        Self {
            retriever,
            assembler,
            top_k,
        }
    }

    /// The `k` best passages for `query`.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        self.retriever.retrieve(query, k).await
    }

    /// Retrieve the configured number of passages and frame them.
    pub async fn build_context(&self, query: &str) -> Result<PromptContext> {
        let query = validate_query(query)?;
        let chunks = self.retriever.retrieve(query, self.top_k).await?;
        debug!(
            "Selected passages {:?} for query",
            chunks.iter().map(|c| c.position).collect::<Vec<_>>()
        );
        Ok(self.assembler.assemble(&chunks))
    }

    pub fn strategy(&self) -> RetrieverStrategy {
        self.retriever.strategy()
    }

    /// Get engine statistics.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            strategy: self.retriever.strategy(),
            chunks: self.retriever.knowledge().len(),
            top_k: self.top_k,
        }
    }
}

/// Builder for [`RetrievalEngine`].
pub struct RetrievalEngineBuilder {
    config: RetrievalConfig,
    knowledge: Option<KnowledgeBase>,
    provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl RetrievalEngineBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: RetrievalConfig::default(),
            knowledge: None,
            provider: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: RetrieverStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the number of passages per prompt.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Set the prompt framing.
    pub fn with_prompt(mut self, prompt: PromptConfig) -> Self {
        self.config.prompt = prompt;
        self
    }

    /// Use `knowledge` instead of loading it from the configured paths.
    pub fn with_knowledge_base(mut self, knowledge: KnowledgeBase) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    /// Use `provider` for query embeddings instead of the configured API.
    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Load the knowledge base and build the engine.
    pub async fn build(self) -> Result<RetrievalEngine> {
        let config = self.config;
        config.validate()?;

        info!("Initializing {} retrieval engine", config.strategy);

        let retriever: Arc<dyn Retriever> = match config.strategy {
            RetrieverStrategy::Lexical => {
                let knowledge = match self.knowledge {
                    Some(knowledge) => knowledge,
                    None => KnowledgeBase::load(&FileSource::new(&config.knowledge_path)),
                };
                Arc::new(LexicalRetriever::new(Arc::new(knowledge)))
            }
            RetrieverStrategy::Embedding => {
                let knowledge = match self.knowledge {
                    Some(knowledge) => knowledge,
                    None => KnowledgeBase::load_vector_store(&config.embeddings_path).await?,
                };
                let provider: Arc<dyn EmbeddingProvider> = match self.provider {
                    Some(provider) => provider,
                    None => Arc::new(
                        OpenAIProvider::new()
                            .with_base_url(config.embedding.base_url.clone())
                            .with_timeout(Duration::from_secs(config.embedding.timeout_secs)),
                    ),
                };
                let mut retriever = EmbeddingRetriever::new(Arc::new(knowledge), provider)?;
                if let Some(model) = &config.embedding.model {
                    retriever = retriever.with_model(model.clone());
                }
                Arc::new(retriever)
            }
        };

        info!(
            "Retrieval engine ready: {} passages, top {}",
            retriever.knowledge().len(),
            config.top_k
        );

        Ok(RetrievalEngine::new(
            retriever,
            PromptAssembler::new(config.prompt),
            config.top_k,
        ))
    }
}

impl Default for RetrievalEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the retrieval engine.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    /// Strategy serving requests.
    pub strategy: RetrieverStrategy,

    /// Number of passages in the knowledge base.
    pub chunks: usize,

    /// Passages per prompt.
    pub top_k: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetrievalError;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_builder_with_fixture_knowledge() {
        let engine = RetrievalEngine::builder()
            .with_knowledge_base(KnowledgeBase::from_passages(["a", "b", "c", "d"]))
            .with_top_k(2)
            .build()
            .await
            .unwrap();

        let stats = engine.stats();
        assert_eq!(stats.strategy, RetrieverStrategy::Lexical);
        assert_eq!(stats.chunks, 4);
        assert_eq!(stats.top_k, 2);
    }

    #[tokio::test]
    async fn test_build_context_uses_top_k() {
        let engine = RetrievalEngine::builder()
            .with_knowledge_base(KnowledgeBase::from_passages([
                "Plans start at 10 euros.",
                "We are based in Lisbon.",
                "Plans can be cancelled anytime.",
            ]))
            .with_top_k(2)
            .with_prompt(PromptConfig::default().with_subject("Acme"))
            .build()
            .await
            .unwrap();

        let prompt = engine.build_context("What plans do you offer?").await.unwrap();
        assert_eq!(prompt.sources, vec![0, 2]);
        assert!(prompt.system_prompt.contains("about Acme:"));
    }

    #[tokio::test]
    async fn test_missing_knowledge_file_still_builds() {
        let temp_dir = TempDir::new().unwrap();
        let engine = RetrievalEngine::builder()
            .with_config(RetrievalConfig::new(temp_dir.path().join("missing.md")))
            .build()
            .await
            .unwrap();

        assert_eq!(engine.stats().chunks, 0);
        let prompt = engine.build_context("anything").await.unwrap();
        assert!(prompt.sources.is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_rejected_before_retrieval() {
        let engine = RetrievalEngine::builder()
            .with_knowledge_base(KnowledgeBase::from_passages(["a"]))
            .build()
            .await
            .unwrap();

        assert!(matches!(
            engine.build_context("   ").await,
            Err(RetrievalError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_zero_top_k_is_rejected() {
        let result = RetrievalEngine::builder().with_top_k(0).build().await;
        assert!(matches!(result, Err(RetrievalError::Config(_))));
    }
}
