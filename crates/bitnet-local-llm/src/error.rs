//! Error types for the inference layer

use std::time::Duration;
use thiserror::Error;

/// Why a generation could not use the real model.
///
/// None of these reach an HTTP client: the orchestrator logs them and
/// answers in fallback mode instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InferenceError {
    /// The `llama-cli` executable was not found at startup
    #[error("binary_missing: {0}")]
    BinaryMissing(String),

    /// The GGUF model file was not found at startup
    #[error("model_missing: {0}")]
    ModelMissing(String),

    /// The child process could not be started, or an I/O error occurred
    /// while talking to it
    #[error("spawn_error: {0}")]
    SpawnFailure(String),

    /// The child exited with a non-zero status
    #[error("nonzero_exit: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    /// The child ran past the wall-clock limit and was killed
    #[error("timeout")]
    Timeout(Duration),
}

impl InferenceError {
    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::BinaryMissing(_) => "binary_missing",
            InferenceError::ModelMissing(_) => "model_missing",
            InferenceError::SpawnFailure(_) => "spawn_error",
            InferenceError::NonZeroExit { .. } => "nonzero_exit",
            InferenceError::Timeout(_) => "timeout",
        }
    }

    /// Exit code of the child, when it exited on its own with a failure.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            InferenceError::NonZeroExit { code, .. } => *code,
            _ => None,
        }
    }
}

/// Failure to decode a transport-encoded provenance artifact
#[derive(Debug, Error)]
pub enum ProvenanceError {
    #[error("artifact is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("artifact is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_failure_messages() {
        assert_eq!(InferenceError::Timeout(Duration::from_secs(120)).to_string(), "timeout");
        assert_eq!(
            InferenceError::NonZeroExit {
                code: Some(1),
                stderr: "bad model".into()
            }
            .to_string(),
            "nonzero_exit: bad model"
        );
        assert_eq!(
            InferenceError::SpawnFailure("No such file or directory".into()).to_string(),
            "spawn_error: No such file or directory"
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(InferenceError::ModelMissing("/m".into()).kind(), "model_missing");
        assert_eq!(InferenceError::Timeout(Duration::ZERO).kind(), "timeout");
    }
}
