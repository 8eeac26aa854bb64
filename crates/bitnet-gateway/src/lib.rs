//! `bitnet-gateway`: OpenAI-compatible HTTP API for a local BitNet model.
//!
//! Translates OpenAI chat-completion requests into prompts for
//! [`bitnet_local_llm::InferenceOrchestrator`] and shapes its replies back
//! into OpenAI response JSON. Clients cannot tell that generation happens in
//! a `llama-cli` subprocess.
//!
//! Inference problems never surface as HTTP errors: with the model or
//! binary absent, or after a crash or timeout, the API still answers `200`
//! with a fallback reply. Only malformed request bodies produce `500`.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use bitnet_gateway::config::GatewayConfig;
//! use bitnet_gateway::server::GatewayServer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut config = GatewayConfig::default();
//!     config.port = 8936;
//!     config.inference.model_path = "/models/ggml-model-i2_s.gguf".into();
//!     config.inference.binary_path = "/opt/bitnet/llama-cli".into();
//!
//!     GatewayServer::new(config).start().await.unwrap();
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use bitnet_local_llm as inference;
