//! Precomputed vector stores.
//!
//! A store is a JSON array of `{ "text": ..., "embedding": [...] }` records.
//! It is produced offline by embedding every passage of the knowledge
//! document once, and loaded read-only at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::provider::{EmbeddingProvider, EmbeddingRequest};

/// One passage and its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreEntry {
    /// Passage text.
    pub text: String,

    /// Embedding of `text`.
    pub embedding: Embedding,
}

/// An ordered, dimension-consistent collection of embedded passages.
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    entries: Vec<VectorStoreEntry>,
    dimension: usize,
}

impl VectorStore {
    /// Build a store, checking that every entry has the same dimension.
    pub fn new(entries: Vec<VectorStoreEntry>) -> Result<Self> {
        let dimension = entries.first().map_or(0, |e| e.embedding.len());
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: bad.embedding.len(),
            });
        }
        Ok(Self { entries, dimension })
    }

    /// Parse a store from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<VectorStoreEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Load a store from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let store = Self::from_json(&content).map_err(|e| EmbeddingError::MalformedStore {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!(
            "Loaded {} embedded passages ({} dimensions) from {}",
            store.len(),
            store.dimension,
            path.display()
        );
        Ok(store)
    }

    /// Write the store to disk as pretty-printed JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.entries)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        fs::write(path, content).await?;
        debug!("Saved {} store entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Embed every passage with `provider` in a single batch.
    pub async fn embed_passages(
        provider: &dyn EmbeddingProvider,
        passages: Vec<String>,
    ) -> Result<Self> {
        let requests = passages.iter().map(EmbeddingRequest::new).collect();
        let responses = provider.embed_batch(requests).await?;

        if responses.len() != passages.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "embedded {} of {} passages",
                responses.len(),
                passages.len()
            )));
        }

        let entries = passages
            .into_iter()
            .zip(responses)
            .map(|(text, response)| VectorStoreEntry {
                text,
                embedding: response.embedding,
            })
            .collect();
        Self::new(entries)
    }

    /// Entries in their original order.
    pub fn entries(&self) -> &[VectorStoreEntry] {
        &self.entries
    }

    /// Shared dimension of every embedding (0 for an empty store).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<VectorStoreEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EmbeddingResponse;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn entry(text: &str, embedding: Vec<f32>) -> VectorStoreEntry {
        VectorStoreEntry {
            text: text.to_string(),
            embedding,
        }
    }

    /// Embeds a text as `[len, 1.0]`.
    struct LengthProvider;

    #[async_trait]
    impl EmbeddingProvider for LengthProvider {
        fn name(&self) -> &str {
            "length"
        }

        fn default_model(&self) -> &str {
            "length-v1"
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
            Ok(EmbeddingResponse {
                embedding: vec![request.text.len() as f32, 1.0],
                model: "length-v1".to_string(),
                dimension: 2,
                tokens_used: None,
            })
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_parses_precomputed_json() {
        let json = r#"[
            {"text": "alpha", "embedding": [1.0, 0.0]},
            {"text": "beta", "embedding": [0.0, 1.0]}
        ]"#;
        let store = VectorStore::from_json(json).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), 2);
        assert_eq!(store.entries()[1].text, "beta");
    }

    #[test]
    fn test_rejects_mixed_dimensions() {
        let result = VectorStore::new(vec![
            entry("a", vec![1.0, 0.0]),
            entry("b", vec![1.0, 0.0, 0.0]),
        ]);
        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/embeddings.json");
        let store = VectorStore::new(vec![entry("a", vec![0.5, 0.5])]).unwrap();

        store.save(&path).await.unwrap();
        let loaded = VectorStore::load(&path).await.unwrap();

        assert_eq!(loaded.entries(), store.entries());
    }

    #[tokio::test]
    async fn test_load_reports_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("embeddings.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = VectorStore::load(&path).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::MalformedStore { .. }));
    }

    #[tokio::test]
    async fn test_embed_passages_keeps_order() {
        let passages = vec!["one".to_string(), "three".to_string()];
        let store = VectorStore::embed_passages(&LengthProvider, passages)
            .await
            .unwrap();

        assert_eq!(
            store.entries(),
            &[entry("one", vec![3.0, 1.0]), entry("three", vec![5.0, 1.0])]
        );
    }
}
