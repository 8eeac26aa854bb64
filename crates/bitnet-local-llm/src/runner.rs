//! Child-process execution of the `llama-cli` binary
//!
//! The binary is invoked with an explicit argument vector, never through a
//! shell, so the prompt reaches it as a single untouched argument. Every run
//! gets its own child; nothing is pooled.

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::request::GenerationRequest;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Longest stderr excerpt carried into logs and failure reasons.
const STDERR_EXCERPT_CHARS: usize = 500;
const STDERR_TRUNCATED_MARKER: &str = "...[truncated]";

/// Result of one child-process run. Every subprocess error collapses into
/// `Failure`; nothing is raised past this boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// Exit status 0. `text` is the raw, unfiltered stdout.
    Success { text: String },
    Failure { reason: InferenceError },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }
}

/// Runs a generation job to completion (or to its timeout).
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, request: &GenerationRequest) -> GenerationOutcome;
}

/// [`ProcessRunner`] backed by a llama.cpp `llama-cli` executable.
#[derive(Debug, Clone)]
pub struct LlamaCliRunner {
    binary_path: PathBuf,
    model_path: String,
    timeout: Duration,
}

impl LlamaCliRunner {
    pub fn new(
        binary_path: impl Into<PathBuf>,
        model_path: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            binary_path: binary_path.into(),
            model_path: model_path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(&config.binary_path, &config.model_path, config.timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Argument vector for one run. GPU offload is disabled and the batch
    /// size pinned to 1 for low-resource CPU inference.
    pub fn build_args(&self, request: &GenerationRequest) -> Vec<String> {
        vec![
            "-m".to_string(),
            self.model_path.clone(),
            "-p".to_string(),
            request.prompt().to_string(),
            "-n".to_string(),
            request.max_tokens().to_string(),
            "-t".to_string(),
            request.thread_count().to_string(),
            "-c".to_string(),
            request.context_size().to_string(),
            "--temp".to_string(),
            request.temperature().to_string(),
            "-ngl".to_string(),
            "0".to_string(),
            "-b".to_string(),
            "1".to_string(),
        ]
    }

    fn failure(&self, reason: InferenceError, started: Instant) -> GenerationOutcome {
        tracing::error!(
            binary = %self.binary_path.display(),
            kind = reason.kind(),
            exit_code = ?reason.exit_code(),
            reason = %reason,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "llama-cli run failed"
        );
        GenerationOutcome::Failure { reason }
    }
}

#[async_trait]
impl ProcessRunner for LlamaCliRunner {
    async fn run(&self, request: &GenerationRequest) -> GenerationOutcome {
        let args = self.build_args(request);
        // Only the flags ahead of the prompt are logged.
        tracing::info!(
            binary = %self.binary_path.display(),
            args = ?&args[..2],
            prompt_chars = request.prompt().chars().count(),
            max_tokens = request.max_tokens(),
            "running BitNet inference"
        );

        let started = Instant::now();
        let mut child = match Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return self.failure(InferenceError::SpawnFailure(e.to_string()), started),
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Pipes are drained while waiting so a chatty child cannot block on
        // a full pipe buffer.
        let collected = tokio::time::timeout(self.timeout, async {
            tokio::try_join!(child.wait(), drain(stdout), drain(stderr))
        })
        .await;

        match collected {
            Err(_elapsed) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "failed to kill timed-out llama-cli child");
                }
                self.failure(InferenceError::Timeout(self.timeout), started)
            }
            Ok(Err(e)) => {
                if let Err(kill_err) = child.kill().await {
                    tracing::debug!(error = %kill_err, "kill after I/O error failed");
                }
                self.failure(InferenceError::SpawnFailure(e.to_string()), started)
            }
            Ok(Ok((status, out, err))) => {
                if !status.success() {
                    let stderr = String::from_utf8_lossy(&err);
                    return self.failure(
                        InferenceError::NonZeroExit {
                            code: status.code(),
                            stderr: truncate_chars(
                                stderr.trim(),
                                STDERR_EXCERPT_CHARS,
                                STDERR_TRUNCATED_MARKER,
                            ),
                        },
                        started,
                    );
                }
                let text = String::from_utf8_lossy(&out).into_owned();
                tracing::info!(
                    stdout_bytes = out.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "llama-cli exited successfully"
                );
                GenerationOutcome::Success { text }
            }
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// First `max_chars` characters of `text`, with `marker` appended when cut.
/// Never splits a multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{marker}", &text[..idx]),
        None => text.to_string(),
    }
}
