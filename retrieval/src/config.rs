//! Configuration for the retrieval engine.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};
use crate::prompt::PromptConfig;

/// Configuration for the retrieval engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Knowledge document used by the lexical strategy.
    pub knowledge_path: PathBuf,

    /// Precomputed vector store used by the embedding strategy.
    pub embeddings_path: PathBuf,

    /// Which retriever serves requests.
    pub strategy: RetrieverStrategy,

    /// Number of passages placed in the prompt.
    pub top_k: usize,

    /// Prompt framing.
    pub prompt: PromptConfig,

    /// Query embedding provider configuration.
    pub embedding: EmbeddingConfig,
}

impl RetrievalConfig {
    pub const DEFAULT_TOP_K: usize = 3;

    /// Create a new configuration with default values.
    pub fn new(knowledge_path: impl Into<PathBuf>) -> Self {
        Self {
            knowledge_path: knowledge_path.into(),
            ..Self::default()
        }
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: RetrieverStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the number of passages per prompt.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the vector store path.
    pub fn with_embeddings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.embeddings_path = path.into();
        self
    }

    /// Set the prompt configuration.
    pub fn with_prompt(mut self, config: PromptConfig) -> Self {
        self.prompt = config;
        self
    }

    /// Set the embedding configuration.
    pub fn with_embedding(mut self, config: EmbeddingConfig) -> Self {
        self.embedding = config;
        self
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `KBQA_*` overrides looked up through `lookup`.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("KBQA_KNOWLEDGE_PATH") {
            self.knowledge_path = path.into();
        }
        if let Some(path) = lookup("KBQA_EMBEDDINGS_PATH") {
            self.embeddings_path = path.into();
        }
        if let Some(strategy) = lookup("KBQA_STRATEGY") {
            self.strategy = strategy.parse()?;
        }
        if let Some(top_k) = lookup("KBQA_TOP_K") {
            self.top_k = top_k
                .trim()
                .parse()
                .map_err(|_| RetrievalError::Config(format!("KBQA_TOP_K is not a count: {top_k}")))?;
        }
        if let Some(subject) = lookup("KBQA_SUBJECT") {
            self.prompt.subject = subject;
        }
        if let Some(model) = lookup("KBQA_EMBEDDING_MODEL") {
            self.embedding.model = Some(model);
        }
        if let Some(url) = lookup("KBQA_EMBEDDING_BASE_URL") {
            self.embedding.base_url = url;
        }
        Ok(())
    }

    /// Check values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(RetrievalError::Config("top_k must be at least 1".to_string()));
        }
        if self.prompt.max_chunk_chars == Some(0) {
            return Err(RetrievalError::Config(
                "prompt.max_chunk_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            knowledge_path: PathBuf::from("knowledgebase.md"),
            embeddings_path: PathBuf::from("embeddings.json"),
            strategy: RetrieverStrategy::default(),
            top_k: Self::DEFAULT_TOP_K,
            prompt: PromptConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Configuration for the query embedding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible embeddings API.
    pub base_url: String,

    /// Model to use for embeddings; the provider default when unset.
    pub model: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: kbqa_embeddings::OpenAIProvider::DEFAULT_BASE_URL.to_string(),
            model: None,
            timeout_secs: 30,
        }
    }
}

/// Which retriever ranks passages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrieverStrategy {
    /// Term-frequency cosine similarity.
    #[default]
    Lexical,
    /// Dense embeddings from an external model.
    Embedding,
}

impl RetrieverStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Embedding => "embedding",
        }
    }
}

impl fmt::Display for RetrieverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrieverStrategy {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" => Ok(Self::Lexical),
            "embedding" => Ok(Self::Embedding),
            other => Err(RetrievalError::Config(format!(
                "unknown retrieval strategy: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.strategy, RetrieverStrategy::Lexical);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.knowledge_path, PathBuf::from("knowledgebase.md"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RetrievalConfig::from_toml_str(
            r#"
            strategy = "embedding"
            top_k = 2

            [prompt]
            subject = "Acme Widgets"
            "#,
        )
        .unwrap();

        assert_eq!(config.strategy, RetrieverStrategy::Embedding);
        assert_eq!(config.top_k, 2);
        assert_eq!(config.prompt.subject, "Acme Widgets");
        assert_eq!(config.prompt.max_chunk_chars, None);
        assert_eq!(config.embeddings_path, PathBuf::from("embeddings.json"));
    }

    #[test]
    fn test_bad_toml_is_a_format_error() {
        assert!(matches!(
            RetrievalConfig::from_toml_str("strategy = \"psychic\""),
            Err(RetrievalError::ConfigFormat(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("KBQA_STRATEGY", "Embedding"),
            ("KBQA_TOP_K", " 2 "),
            ("KBQA_SUBJECT", "Our Product"),
        ]);
        let mut config = RetrievalConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.strategy, RetrieverStrategy::Embedding);
        assert_eq!(config.top_k, 2);
        assert_eq!(config.prompt.subject, "Our Product");
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = RetrievalConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == "KBQA_TOP_K").then(|| "three".to_string())
        });
        assert!(matches!(result, Err(RetrievalError::Config(_))));
    }

    #[test]
    fn test_zero_top_k_is_invalid() {
        assert!(RetrievalConfig::default().with_top_k(0).validate().is_err());
    }
}
