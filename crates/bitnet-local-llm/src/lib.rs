//! # bitnet-local-llm
//!
//! Subprocess-backed inference for a locally hosted BitNet GGUF model.
//!
//! Generation is delegated to an external `llama-cli` binary. This crate owns
//! everything around that call:
//!
//! | Component | Role |
//! |-----------|------|
//! | [`LlamaCliRunner`] | Spawns the binary with an explicit argv, enforces the wall-clock timeout |
//! | [`LlamaOutputExtractor`] | Strips llama.cpp diagnostics from stdout, recovers the generated text |
//! | [`ProvenanceBuilder`] | Encodes a digest-based audit record for every response |
//! | [`InferenceOrchestrator`] | Composes the above; falls back to a canned reply on any failure |
//!
//! The orchestrator never returns an error: a missing model, a missing
//! binary, a crash or a timeout all end in fallback mode. Callers always get
//! response text plus a provenance string.
//!
//! The "proof" produced by [`ProvenanceBuilder`] is an audit record only. It
//! carries SHA-256 digests and a timestamp and proves nothing about the
//! computation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bitnet_local_llm::{GenerationRequest, InferenceConfig, InferenceOrchestrator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = InferenceConfig::new("/models/ggml-model-i2_s.gguf", "/opt/bitnet/llama-cli");
//!     let orchestrator = InferenceOrchestrator::new(config);
//!     let request = GenerationRequest::new("user: hello", orchestrator.config());
//!     let generation = orchestrator.generate(&request).await;
//!     println!("{} ({})", generation.text, generation.mode);
//! }
//! ```

pub mod availability;
pub mod config;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod provenance;
pub mod request;
pub mod runner;

pub use availability::ModelAvailability;
pub use config::InferenceConfig;
pub use error::{InferenceError, ProvenanceError};
pub use extract::{LlamaOutputExtractor, OutputExtractor};
pub use orchestrator::{Generation, InferenceMode, InferenceOrchestrator, fallback_message};
pub use provenance::{ProofType, ProvenanceArtifact, ProvenanceBuilder};
pub use request::GenerationRequest;
pub use runner::{GenerationOutcome, LlamaCliRunner, ProcessRunner, truncate_chars};
