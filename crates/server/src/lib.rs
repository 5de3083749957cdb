//! HTTP front end for the Marksift pipeline.
//!
//! Exposes `POST /api/parse` and `GET /healthz`. Every failure leaves the
//! service as `{ "error": message }` with a status derived from the error
//! kind. Requests that outlive the router timeout get 408 and panics are
//! caught and reported as 500.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use marksift_core::Pipeline;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub mod config;
pub mod handlers;

pub use config::{ConfigError, ServerConfig};

/// Shared, read-only state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline: Arc::new(pipeline) }
    }
}

/// Build the service router
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/api/parse", post(handlers::parse_article))
        .route("/healthz", get(handlers::health_check))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(middleware::map_response(handlers::timeout_envelope))
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(TraceLayer::new_for_http())
}
