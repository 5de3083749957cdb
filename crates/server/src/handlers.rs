use std::any::Any;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use marksift_core::{ErrorKind, MarksiftError};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
}

/// Response status for a failed conversion
pub fn status_for(err: &MarksiftError) -> StatusCode {
    match err.kind() {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::Fetch | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Extraction => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn error_response(err: &MarksiftError) -> Response {
    (status_for(err), Json(ErrorResponse { error: err.to_string() })).into_response()
}

/// `POST /api/parse`
///
/// A body that does not decode as a request is treated the same as a
/// request without a URL.
pub async fn parse_article(State(state): State<AppState>, payload: Result<Json<ParseRequest>, JsonRejection>) -> Response {
    let url = match payload {
        Ok(Json(request)) => request.url.unwrap_or_default(),
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "rejected request body");
            String::new()
        }
    };

    match state.pipeline.run(&url).await {
        Ok(converted) => {
            info!(
                url = %url,
                profile = converted.profile.as_deref().unwrap_or("none"),
                used_fallback = converted.used_fallback,
                "converted article"
            );
            (StatusCode::OK, Json(ParseResponse { title: converted.title, content: converted.markdown })).into_response()
        }
        Err(err) => {
            match err.kind() {
                ErrorKind::Input | ErrorKind::Extraction => warn!(url = %url, error = %err, "conversion rejected"),
                ErrorKind::Fetch | ErrorKind::Internal => error!(url = %url, error = %err, "conversion failed"),
            }
            error_response(&err)
        }
    }
}

/// `GET /healthz`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "OK".to_string() })
}

/// Give the timeout layer's bare 408 the usual error body
pub async fn timeout_envelope(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    warn!("request timed out");
    (StatusCode::REQUEST_TIMEOUT, Json(ErrorResponse { error: "Request timed out".to_string() })).into_response()
}

/// Panic handler for the catch-panic layer
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!(detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: "Internal server error".to_string() }),
    )
        .into_response()
}
