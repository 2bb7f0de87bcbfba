//! Anthropic Messages API gateway.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{CompletionError, Result};
use crate::gateway::{CompletionGateway, CompletionRequest, CompletionResponse};

/// Gateway for `POST {base_url}/v1/messages`.
pub struct AnthropicGateway {
    /// API key.
    api_key: Option<String>,

    /// API base URL.
    base_url: String,

    /// HTTP client.
    client: reqwest::Client,

    /// Default model.
    model: String,

    /// Upper bound on generated tokens.
    max_tokens: u32,

    /// Sampling temperature.
    temperature: f32,
}

impl AnthropicGateway {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const DEFAULT_MODEL: &'static str = "claude-3-7-sonnet-20250219";
    pub const API_VERSION: &'static str = "2023-06-01";

    /// Create a gateway using `ANTHROPIC_API_KEY` from the environment.
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.3,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Bound every request to the API by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }
}

impl Default for AnthropicGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionGateway for AnthropicGateway {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| CompletionError::NotConfigured("ANTHROPIC_API_KEY is not set".to_string()))?;

        let model = request.model.unwrap_or_else(|| self.model.clone());
        let body = MessagesRequest {
            model: &model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: &request.system,
            messages: vec![Message {
                role: "user",
                content: &request.user,
            }],
        };

        debug!("Sending completion request with model: {model}");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", Self::API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Completion API error response ({status}): {body}");
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let result: MessagesResponse = response.json().await?;
        let text = result.text().ok_or_else(|| {
            CompletionError::InvalidResponse("response carries no text content".to_string())
        })?;

        info!("Received completion of {} characters", text.len());

        Ok(CompletionResponse {
            text,
            model: result.model.unwrap_or(model),
            stop_reason: result.stop_reason,
        })
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    /// Legacy text-completions field.
    #[serde(default)]
    completion: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
}

impl MessagesResponse {
    /// Concatenated text blocks, falling back to the legacy field.
    fn text(&self) -> Option<String> {
        let blocks: Vec<&str> = self
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if blocks.is_empty() {
            self.completion.clone()
        } else {
            Some(blocks.concat())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}
