//! Question answering handler.
//!
//! Retrieves passages for the question, frames them, and asks the
//! completion gateway for an answer.

use std::sync::Arc;

use kbqa_completion::{CompletionGateway, CompletionRequest};
use kbqa_retrieval::{EngineStats, RetrievalEngine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::HandlerError;

/// Body of a question request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub user_query: Option<String>,
}

/// Body of a successful answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "aiReply")]
    pub ai_reply: String,
}

/// Handler for question answering.
pub struct QueryHandler {
    engine: RetrievalEngine,
    gateway: Arc<dyn CompletionGateway>,
}

impl QueryHandler {
    pub fn new(engine: RetrievalEngine, gateway: Arc<dyn CompletionGateway>) -> Self {
        Self { engine, gateway }
    }

    /// Answer one question.
    pub async fn answer(&self, params: QueryParams) -> Result<QueryResponse, HandlerError> {
        let user_query = params
            .user_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(HandlerError::MissingQuery)?;

        let prompt = self.engine.build_context(user_query).await?;
        debug!("System prompt: {}", prompt.system_prompt);

        let completion = self
            .gateway
            .complete(CompletionRequest::new(prompt.system_prompt, user_query))
            .await?;

        info!(
            "Answered query using passages {:?} via {}",
            prompt.sources,
            self.gateway.name()
        );

        Ok(QueryResponse {
            ai_reply: completion.text,
        })
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok",
            gateway: self.gateway.name().to_string(),
            gateway_available: self.gateway.is_available(),
            retrieval: self.engine.stats(),
        }
    }
}

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub gateway: String,
    pub gateway_available: bool,
    #[serde(flatten)]
    pub retrieval: EngineStats,
}
