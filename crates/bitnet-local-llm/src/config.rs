//! Configuration for the llama-cli inference backend

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the subprocess inference backend.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// request. There is no reload path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Path to the GGUF model file passed to the binary via `-m`
    pub model_path: String,

    /// Path to the `llama-cli` executable
    pub binary_path: String,

    /// Model identifier recorded in provenance artifacts
    pub model_id: String,

    /// Engine name recorded in provenance artifacts for real inference
    pub engine: String,

    /// Tokens to generate when the request does not say
    pub max_tokens: u32,

    /// Sampling temperature when the request does not say (0.0 = greedy)
    pub temperature: f32,

    /// Context window handed to the binary via `-c`
    pub context_size: u32,

    /// Threads per child process, via `-t`
    pub thread_count: u32,

    /// Hard wall-clock limit for a single generation, in seconds
    pub timeout_secs: u64,

    /// Maximum number of child processes running at once.
    /// If None, derived from the CPU thread count divided by `thread_count`.
    pub max_concurrency: Option<usize>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_path: String::from("../BitNet/models/BitNet-b1.58-2B-4T/ggml-model-i2_s.gguf"),
            binary_path: String::from("../BitNet/build/bin/llama-cli"),
            model_id: String::from("BitNet-b1.58-2B-4T"),
            engine: String::from("risc0"),
            max_tokens: 50,
            temperature: 0.8,
            context_size: 2048,
            thread_count: 2,
            timeout_secs: 120,
            max_concurrency: None,
        }
    }
}

impl InferenceConfig {
    pub fn new(model_path: impl Into<String>, binary_path: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            binary_path: binary_path.into(),
            ..Default::default()
        }
    }

    /// Set the model identifier recorded in provenance
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Set the default number of tokens to generate
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Result<Self, &'static str> {
        if max_tokens == 0 {
            return Err("max_tokens must be > 0");
        }
        self.max_tokens = max_tokens;
        Ok(self)
    }

    /// Set the default sampling temperature
    pub fn with_temperature(mut self, temp: f32) -> Result<Self, &'static str> {
        if !(0.0..=2.0).contains(&temp) {
            return Err("temperature must be between 0.0 and 2.0");
        }
        self.temperature = temp;
        Ok(self)
    }

    /// Set the context window size
    pub fn with_context_size(mut self, context_size: u32) -> Result<Self, &'static str> {
        if context_size == 0 {
            return Err("context_size must be > 0");
        }
        self.context_size = context_size;
        Ok(self)
    }

    /// Set the number of threads per child process
    pub fn with_thread_count(mut self, threads: u32) -> Result<Self, &'static str> {
        if threads == 0 {
            return Err("thread_count must be > 0");
        }
        self.thread_count = threads;
        Ok(self)
    }

    /// Set the per-generation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, &'static str> {
        if timeout.is_zero() {
            return Err("timeout must be > 0");
        }
        self.timeout_secs = timeout.as_secs().max(1);
        Ok(self)
    }

    /// Cap the number of simultaneously running child processes
    pub fn with_max_concurrency(mut self, limit: usize) -> Result<Self, &'static str> {
        if limit == 0 {
            return Err("max_concurrency must be > 0");
        }
        self.max_concurrency = Some(limit);
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check invariants that serde cannot express. Used after loading a
    /// config file, where the builder methods were bypassed.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_tokens == 0 {
            return Err("max_tokens must be > 0");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0");
        }
        if self.context_size == 0 {
            return Err("context_size must be > 0");
        }
        if self.thread_count == 0 {
            return Err("thread_count must be > 0");
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0");
        }
        if self.max_concurrency == Some(0) {
            return Err("max_concurrency must be > 0");
        }
        Ok(())
    }
}
