//! Gateway error types

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors that reach the HTTP client.
///
/// Inference problems are not in here: the orchestrator absorbs them and
/// answers in fallback mode. Only request-shape problems surface, always as
/// `500 {"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed request body: {0}")]
    MalformedRequestBody(String),
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::MalformedRequestBody(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "chat completion error");
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure to assemble the runtime configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parsing error: {0}")]
    Parse(String),

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}
