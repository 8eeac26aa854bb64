//! Shared application state for the HTTP handlers

use bitnet_local_llm::{InferenceOrchestrator, ModelAvailability};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Single entry point for generation; read-only after startup
    pub orchestrator: Arc<InferenceOrchestrator>,
    /// Chat completion requests handled since start
    requests_served: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(orchestrator: Arc<InferenceOrchestrator>) -> Self {
        Self {
            orchestrator,
            requests_served: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn availability(&self) -> ModelAvailability {
        self.orchestrator.availability()
    }

    pub fn record_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }
}
