//! OpenAI-compatible chat completions
//!
//! POST /v1/chat/completions - flatten the conversation into a prompt, run it
//! through the orchestrator, and wrap the reply in a `chat.completion`
//! envelope with an extra `zkml_proof` field.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use bitnet_local_llm::{GenerationRequest, truncate_chars};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GatewayResult;
use crate::handlers::models::MODEL_ID;
use crate::state::AppState;

/// Longest prompt prefix written to the log.
const PROMPT_LOG_CHARS: usize = 100;

/// Request body for POST /v1/chat/completions
///
/// Other OpenAI fields (`stream`, `top_p`, `stop`, ...) are accepted and
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_model() -> String {
    MODEL_ID.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: Usage,
    /// Base64 provenance record. An audit trail, not a cryptographic proof.
    pub zkml_proof: String,
}

#[derive(Debug, Serialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: &'static str,
}

/// Whitespace-delimited word counts, not tokenizer counts.
#[derive(Debug, Serialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// `"<role>: <content>"` per message, newline-joined, in order.
pub fn build_prompt(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// POST /v1/chat/completions
pub async fn chat_completions(
    State(state): State<AppState>,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> GatewayResult<Json<ChatCompletionResponse>> {
    let Json(req) = payload?;
    let served = state.record_request();

    let prompt = build_prompt(&req.messages);
    tracing::info!(
        model = %req.model,
        messages = req.messages.len(),
        request_no = served,
        "chat completion request"
    );
    tracing::info!(
        prompt = %truncate_chars(&prompt, PROMPT_LOG_CHARS, "..."),
        "extracted prompt"
    );

    let request = GenerationRequest::new(prompt, state.orchestrator.config())
        .with_max_tokens(req.max_tokens)
        .with_temperature(req.temperature);
    let generation = state.orchestrator.generate(&request).await;

    let prompt_tokens = count_words(request.prompt());
    let completion_tokens = count_words(&generation.text);

    tracing::info!(
        mode = %generation.mode,
        completion_tokens,
        proof_len = generation.proof.len(),
        "chat completion generated"
    );

    Ok(Json(ChatCompletionResponse {
        id: format!("chatcmpl-{}", Uuid::new_v4()),
        object: "chat.completion",
        created: chrono::Utc::now().timestamp(),
        model: req.model,
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content: generation.text,
            },
            finish_reason: "stop",
        }],
        usage: Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
        zkml_proof: generation.proof,
    }))
}

/// Build the chat router sub-tree
pub fn chat_router() -> axum::Router<AppState> {
    use axum::routing::post;
    axum::Router::new().route("/v1/chat/completions", post(chat_completions))
}
