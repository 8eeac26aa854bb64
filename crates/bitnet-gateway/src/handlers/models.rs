//! OpenAI-compatible model listing
//!
//! GET /v1/models - the single locally served model

use axum::{Json, response::IntoResponse};
use serde::Serialize;

use crate::state::AppState;

/// Identifier clients use in the `model` field.
pub const MODEL_ID: &str = "bitnet-b1.58-2b";
/// Fixed creation timestamp reported for the model
pub const MODEL_CREATED: i64 = 1_699_401_600;
pub const MODEL_OWNER: &str = "bitnet-zkml";

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub object: &'static str,
    pub created: i64,
    pub owned_by: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModelList {
    pub object: &'static str,
    pub data: Vec<ModelInfo>,
}

/// GET /v1/models
pub async fn list_models() -> impl IntoResponse {
    Json(ModelList {
        object: "list",
        data: vec![ModelInfo {
            id: MODEL_ID,
            object: "model",
            created: MODEL_CREATED,
            owned_by: MODEL_OWNER,
        }],
    })
}

/// Build the models router sub-tree
pub fn models_router() -> axum::Router<AppState> {
    use axum::routing::get;
    axum::Router::new().route("/v1/models", get(list_models))
}
