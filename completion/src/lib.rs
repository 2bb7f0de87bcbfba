//! # Completion
//!
//! The outbound half of question answering: hand an assembled system prompt
//! and the user's question to a hosted model and relay its answer.

pub mod anthropic;
pub mod error;
pub mod gateway;

pub use anthropic::AnthropicGateway;
pub use error::{CompletionError, Result};
pub use gateway::{CompletionGateway, CompletionRequest, CompletionResponse};
