//! Axum-based HTTP server.
//!
//! [`GatewayServer`] wires the inference orchestrator into an axum service.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Service descriptor with availability flags. |
//! | `GET`  | `/health` | `healthy` / `partial` status, always `200 OK`. |
//! | `GET`  | `/v1/models` | Static OpenAI-style model list. |
//! | `POST` | `/v1/chat/completions` | Chat completion plus `zkml_proof`. |

use crate::config::GatewayConfig;
use crate::handlers::{chat_router, health_router, models_router};
use crate::state::AppState;
use axum::Router;
use bitnet_local_llm::InferenceOrchestrator;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Assemble the full router around `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health_router())
        .merge(models_router())
        .merge(chat_router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// High-level server owning the resolved configuration.
pub struct GatewayServer {
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server from the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Probe model/binary availability and build the axum [`Router`].
    /// Call [`start()`](Self::start) to bind and serve.
    pub fn build_app(&self) -> Router {
        let orchestrator = InferenceOrchestrator::new(self.config.inference.clone());
        build_router(AppState::new(Arc::new(orchestrator)))
    }

    /// Bind to `{host}:{port}` and serve until the process exits.
    pub async fn start(self) -> std::io::Result<()> {
        let app = self.build_app();
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(addr = %addr, "BitNet GGUF API Server listening");
        info!("OpenAI-compatible endpoints:");
        info!("   GET  /health");
        info!("   GET  /v1/models");
        info!("   POST /v1/chat/completions");

        axum::serve(listener, app).await
    }
}
