//! Service status endpoints
//!
//! GET /health - availability of the model file and llama-cli binary
//! GET /       - static service descriptor

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

/// GET /health
///
/// Always 200. `status` is `"healthy"` when both the model and the binary
/// were found at startup, `"partial"` otherwise.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let availability = state.availability();
    Json(json!({
        "status": availability.status_label(),
        "model_loaded": availability.model_present,
        "llama_cli_ready": availability.binary_present,
        "requests_served": state.requests_served(),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

/// GET /
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let availability = state.availability();
    Json(json!({
        "name": "BitNet GGUF API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "OpenAI-compatible API for BitNet GGUF models",
        "endpoints": {
            "health": "/health",
            "models": "/v1/models",
            "chat": "/v1/chat/completions",
        },
        "model_status": {
            "model_loaded": availability.model_present,
            "llama_cli_ready": availability.binary_present,
        },
    }))
}

/// Build the status router sub-tree
pub fn health_router() -> axum::Router<AppState> {
    use axum::routing::get;
    axum::Router::new()
        .route("/health", get(health))
        .route("/", get(index))
}
