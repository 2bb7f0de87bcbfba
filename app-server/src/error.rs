//! Request-level errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kbqa_completion::CompletionError;
use kbqa_retrieval::RetrievalError;
use serde_json::json;
use thiserror::Error;

/// Why a question could not be answered.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// `user_query` missing or blank.
    #[error("Missing 'user_query'")]
    MissingQuery,

    /// The body is not the expected JSON object.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// Passage retrieval failed.
    #[error("retrieval failed: {0}")]
    Retrieval(RetrievalError),

    /// The completion gateway failed.
    #[error("{0}")]
    Completion(#[from] CompletionError),
}

impl From<RetrievalError> for HandlerError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::EmptyQuery => Self::MissingQuery,
            other => Self::Retrieval(other),
        }
    }
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingQuery | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Completion(CompletionError::Upstream { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Retrieval(_) | Self::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `error` field of the response body.
    fn message(&self) -> String {
        match self {
            Self::Completion(CompletionError::Upstream { body, .. }) => body.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
