//! The completion gateway seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One question plus the system prompt that frames it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Instructions and retrieved context.
    pub system: String,

    /// The user's question, verbatim.
    pub user: String,

    /// Model override; the gateway default when unset.
    pub model: Option<String>,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// The model's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text.
    pub text: String,

    /// Model that produced the answer.
    pub model: String,

    /// Why generation stopped, when reported.
    pub stop_reason: Option<String>,
}

/// Something that turns a framed question into an answer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Get the name of this gateway.
    fn name(&self) -> &str;

    /// Generate an answer for `request`.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Check if the gateway can make calls (API key set, etc.).
    fn is_available(&self) -> bool;
}
