//! Inference orchestration: availability gate, bounded dispatch, fallback
//!
//! ```text
//! Idle ──generate()──▶ Dispatching ──Success──▶ Succeeded
//!                          │
//!                          ├── model/binary missing ──▶ FallenBack
//!                          └── Failure{..} ────────────▶ FallenBack
//! ```
//!
//! Both terminal states yield response text and an encoded provenance
//! artifact. `generate` has no error path.

use crate::availability::{ModelAvailability, default_concurrency, detect_cpu_threads};
use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::extract::{DEFAULT_RESPONSE, LlamaOutputExtractor, OutputExtractor};
use crate::provenance::ProvenanceBuilder;
use crate::request::GenerationRequest;
use crate::runner::{GenerationOutcome, LlamaCliRunner, ProcessRunner};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Terminal state of one `generate` call.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceMode {
    Succeeded,
    FallenBack { cause: InferenceError },
}

impl InferenceMode {
    pub fn is_fallback(&self) -> bool {
        matches!(self, InferenceMode::FallenBack { .. })
    }
}

impl fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceMode::Succeeded => write!(f, "real_inference"),
            InferenceMode::FallenBack { cause } => write!(f, "fallback ({})", cause.kind()),
        }
    }
}

/// What the HTTP layer gets back: response text plus provenance string.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    /// Base64 JSON [`ProvenanceArtifact`](crate::ProvenanceArtifact)
    pub proof: String,
    pub mode: InferenceMode,
}

/// Single entry point for text generation.
///
/// Holds only read-only state, so one instance is shared across all
/// concurrent requests. Each dispatch spawns its own child process; a
/// semaphore caps how many run at once.
pub struct InferenceOrchestrator {
    config: Arc<InferenceConfig>,
    availability: ModelAvailability,
    runner: Arc<dyn ProcessRunner>,
    extractor: Arc<dyn OutputExtractor>,
    provenance: ProvenanceBuilder,
    slots: Arc<Semaphore>,
    concurrency_limit: usize,
}

impl InferenceOrchestrator {
    /// Probe the filesystem and wire up the llama-cli runner.
    pub fn new(config: InferenceConfig) -> Self {
        let availability = ModelAvailability::probe(&config);
        let runner = Arc::new(LlamaCliRunner::from_config(&config));
        Self::with_components(
            config,
            availability,
            runner,
            Arc::new(LlamaOutputExtractor::new()),
        )
    }

    /// Assemble from explicit parts. Availability is taken as given.
    pub fn with_components(
        config: InferenceConfig,
        availability: ModelAvailability,
        runner: Arc<dyn ProcessRunner>,
        extractor: Arc<dyn OutputExtractor>,
    ) -> Self {
        let concurrency_limit = config
            .max_concurrency
            .unwrap_or_else(|| default_concurrency(detect_cpu_threads(), config.thread_count))
            .max(1);
        let provenance = ProvenanceBuilder::new(&config.model_id, &config.engine);

        tracing::info!(
            model_present = availability.model_present,
            binary_present = availability.binary_present,
            concurrency_limit,
            threads_per_child = config.thread_count,
            timeout_secs = config.timeout_secs,
            "inference orchestrator ready"
        );

        Self {
            config: Arc::new(config),
            availability,
            runner,
            extractor,
            provenance,
            slots: Arc::new(Semaphore::new(concurrency_limit)),
            concurrency_limit,
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn availability(&self) -> ModelAvailability {
        self.availability
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Generate a reply for `request`. Never fails.
    ///
    /// Completes within the configured timeout even when every slot is
    /// busy: a request that cannot get a slot, or whose run overruns the
    /// remaining budget, falls back with [`InferenceError::Timeout`].
    pub async fn generate(&self, request: &GenerationRequest) -> Generation {
        if let Some(cause) = self.missing_precondition() {
            return self.fall_back(request, cause);
        }

        // One budget covers both the wait for a slot and the run itself.
        let budget = self.config.timeout();
        let deadline = Instant::now() + budget;

        let outcome = {
            let _permit = match tokio::time::timeout_at(deadline, self.slots.acquire()).await {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) => {
                    return self.fall_back(
                        request,
                        InferenceError::SpawnFailure("inference slots closed".to_string()),
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        concurrency_limit = self.concurrency_limit,
                        budget_secs = budget.as_secs(),
                        "no inference slot freed up before the deadline"
                    );
                    return self.fall_back(request, InferenceError::Timeout(budget));
                }
            };
            // Dropping an in-flight run kills its child (`kill_on_drop`).
            match tokio::time::timeout_at(deadline, self.runner.run(request)).await {
                Ok(outcome) => outcome,
                Err(_) => GenerationOutcome::Failure {
                    reason: InferenceError::Timeout(budget),
                },
            }
        };

        match outcome {
            GenerationOutcome::Success { text } => {
                let mut cleaned = self.extractor.clean(&text);
                if cleaned.trim().is_empty() {
                    cleaned = DEFAULT_RESPONSE.to_string();
                }
                let proof = self.provenance.build(request.prompt(), &cleaned, false);
                tracing::info!(chars = cleaned.chars().count(), "BitNet inference completed");
                Generation {
                    text: cleaned,
                    proof,
                    mode: InferenceMode::Succeeded,
                }
            }
            GenerationOutcome::Failure { reason } => self.fall_back(request, reason),
        }
    }

    fn missing_precondition(&self) -> Option<InferenceError> {
        if !self.availability.model_present {
            Some(InferenceError::ModelMissing(self.config.model_path.clone()))
        } else if !self.availability.binary_present {
            Some(InferenceError::BinaryMissing(self.config.binary_path.clone()))
        } else {
            None
        }
    }

    fn fall_back(&self, request: &GenerationRequest, cause: InferenceError) -> Generation {
        tracing::warn!(
            cause = cause.kind(),
            reason = %cause,
            "BitNet inference unavailable, answering in fallback mode"
        );
        let text = fallback_message(request.prompt());
        let proof = self.provenance.build(request.prompt(), &text, true);
        Generation {
            text,
            proof,
            mode: InferenceMode::FallenBack { cause },
        }
    }
}

/// Canned reply that restates the prompt verbatim.
pub fn fallback_message(prompt: &str) -> String {
    format!(
        "I'm a BitNet AI assistant running in fallback mode. You asked: '{prompt}'. \
         The BitNet GGUF model is not currently available for inference, but I'm here to help! \
         Please ensure the BitNet model and llama-cli binary are available."
    )
}
