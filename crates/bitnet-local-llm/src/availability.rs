//! Startup probes for the model file and the inference binary
//!
//! Availability is computed once, from plain filesystem existence checks,
//! and never refreshed. No checksum or format validation is done: a file
//! that exists counts as present.

use crate::config::InferenceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Whether the model weights and the `llama-cli` binary exist on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelAvailability {
    pub model_present: bool,
    pub binary_present: bool,
}

impl ModelAvailability {
    pub fn new(model_present: bool, binary_present: bool) -> Self {
        Self {
            model_present,
            binary_present,
        }
    }

    /// Probe the filesystem for the configured model and binary.
    pub fn probe(config: &InferenceConfig) -> Self {
        let model = Path::new(&config.model_path);
        let model_present = model.exists();
        if model_present {
            let size_mb = std::fs::metadata(model)
                .map(|m| m.len() as f64 / (1024.0 * 1024.0))
                .unwrap_or(0.0);
            tracing::info!(
                path = %config.model_path,
                size_mb = %format!("{size_mb:.1}"),
                "BitNet GGUF model found"
            );
        } else {
            tracing::warn!(path = %config.model_path, "BitNet GGUF model not found");
        }

        let binary_present = Path::new(&config.binary_path).exists();
        if binary_present {
            tracing::info!(path = %config.binary_path, "llama-cli binary found");
        } else {
            tracing::warn!(path = %config.binary_path, "llama-cli binary not found");
        }

        Self {
            model_present,
            binary_present,
        }
    }

    /// Both preconditions for real inference hold.
    pub fn is_ready(&self) -> bool {
        self.model_present && self.binary_present
    }

    /// `"healthy"` when ready, `"partial"` otherwise.
    pub fn status_label(&self) -> &'static str {
        if self.is_ready() { "healthy" } else { "partial" }
    }
}

/// Number of logical CPU threads, never less than 1.
pub fn detect_cpu_threads() -> usize {
    let sys = System::new_with_specifics(RefreshKind::new().with_cpu(CpuRefreshKind::new()));
    let detected = sys.cpus().len();
    if detected > 0 {
        detected
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// How many children may run at once when each one uses `threads_per_child`.
pub fn default_concurrency(cpu_threads: usize, threads_per_child: u32) -> usize {
    let per_child = (threads_per_child as usize).max(1);
    (cpu_threads / per_child).max(1)
}
