//! HTTP server implementation using Axum.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderName, Method, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::HandlerError;
use crate::query_handler::{HealthResponse, QueryHandler, QueryParams, QueryResponse};

/// Path the hosted function was served from.
pub const LEGACY_FUNCTION_PATH: &str = "/.netlify/functions/query-ai";

/// Build the router with all routes.
pub fn build_router(handler: Arc<QueryHandler>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("anthropic-version"),
        ]);

    Router::new()
        .route("/", post(query).options(preflight))
        .route("/query", post(query).options(preflight))
        .route(LEGACY_FUNCTION_PATH, post(query).options(preflight))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

/// Answer a question posted as `{"user_query": "..."}`.
async fn query(
    State(handler): State<Arc<QueryHandler>>,
    body: Bytes,
) -> Result<Json<QueryResponse>, HandlerError> {
    let params = parse_params(&body)?;
    Ok(Json(handler.answer(params).await?))
}

/// An empty body counts as an empty object.
fn parse_params(body: &[u8]) -> Result<QueryParams, HandlerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(QueryParams::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// `OPTIONS` without preflight headers.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn health(State(handler): State<Arc<QueryHandler>>) -> Json<HealthResponse> {
    Json(handler.health())
}

/// Start the HTTP server and run until interrupted.
pub async fn serve(bind: SocketAddr, handler: Arc<QueryHandler>) -> anyhow::Result<()> {
    let app = build_router(handler);
    let listener = tokio::net::TcpListener::bind(bind).await?;

    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    shutdown_on(tokio::signal::ctrl_c()).await;
}

/// Resolve once `signal` fires. A signal that cannot be installed never
/// fires, so the server keeps running.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutting down"),
        Err(err) => {
            error!("Failed to install shutdown signal handler: {err}");
            std::future::pending::<()>().await;
        }
    }
}
