//! Server configuration.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use kbqa_completion::AnthropicGateway;
use kbqa_retrieval::RetrievalConfig;
use serde::{Deserialize, Serialize};

/// Address the server binds when nothing else is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Default `tracing` filter when `RUST_LOG` is unset. Targets outside the
/// workspace log at `warn`.
pub fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,kbqa_server=debug,kbqa_retrieval=debug,kbqa_embeddings=debug,kbqa_completion=debug,tower_http=debug"
    } else {
        "warn,kbqa_server=info,kbqa_retrieval=info,kbqa_embeddings=info,kbqa_completion=info,tower_http=info"
    }
}

/// Top-level configuration, read from `kbqa.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: SocketAddr,

    pub retrieval: RetrievalConfig,

    pub completion: CompletionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            retrieval: RetrievalConfig::default(),
            completion: CompletionConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(anyhow::anyhow!("failed to read {}: {err}", path.display())),
        }
    }
}

/// Completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub base_url: String,

    pub model: String,

    pub max_tokens: u32,

    pub temperature: f32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: AnthropicGateway::DEFAULT_BASE_URL.to_string(),
            model: AnthropicGateway::DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.3,
            timeout_secs: 30,
        }
    }
}

impl CompletionConfig {
    /// Build the gateway these settings describe.
    pub fn gateway(&self) -> AnthropicGateway {
        AnthropicGateway::new()
            .with_base_url(self.base_url.clone())
            .with_model(self.model.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}
