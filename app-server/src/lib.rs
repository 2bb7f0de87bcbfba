//! # Knowledge-base QA server
//!
//! HTTP front end that answers questions from a static knowledge document:
//! retrieve the best passages, frame them in a system prompt, and relay the
//! model's answer.

pub mod config;
pub mod error;
pub mod precompute;
pub mod query_handler;
pub mod server;

pub use config::{CompletionConfig, ServerConfig};
pub use error::HandlerError;
pub use query_handler::{HealthResponse, QueryHandler, QueryParams, QueryResponse};
pub use server::{build_router, serve};
