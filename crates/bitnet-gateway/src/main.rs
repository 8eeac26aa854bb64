//! BitNet GGUF API Server entry point.
//!
//! Resolves configuration from defaults, an optional config file, `BITNET_*`
//! environment variables and command-line flags (see `--help`), then starts
//! the axum HTTP service.
//!
//! # Environment variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BITNET_CONFIG` | *(none)* | Config file (.toml / .yaml / .json). |
//! | `BITNET_HOST` | `0.0.0.0` | Interface to bind. |
//! | `BITNET_PORT` | `8936` | TCP port to listen on. |
//! | `BITNET_MODEL_PATH` | `../BitNet/models/.../ggml-model-i2_s.gguf` | GGUF model file. |
//! | `BITNET_BINARY_PATH` | `../BitNet/build/bin/llama-cli` | llama-cli executable. |
//! | `BITNET_MAX_TOKENS` | `50` | Default tokens to generate. |
//! | `BITNET_TEMPERATURE` | `0.8` | Default sampling temperature. |
//! | `BITNET_CONTEXT_SIZE` | `2048` | Context window. |
//! | `BITNET_THREADS` | `2` | Threads per llama-cli process. |
//! | `BITNET_TIMEOUT_SECS` | `120` | Per-generation timeout. |
//! | `BITNET_MAX_CONCURRENCY` | CPU threads ÷ threads | Concurrent llama-cli processes. |
//! | `RUST_LOG` | `bitnet_gateway=info,...` | Log filter. |

use bitnet_gateway::cli::Cli;
use bitnet_gateway::server::GatewayServer;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "bitnet_gateway=info,bitnet_local_llm=info,tower_http=info";

#[tokio::main]
async fn main() {
    // Initialise structured logging.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    info!("Starting BitNet GGUF API Server");
    info!(
        addr = %config.bind_addr(),
        model_path = %config.inference.model_path,
        binary_path = %config.inference.binary_path,
        max_tokens = config.inference.max_tokens,
        temperature = config.inference.temperature,
        context_size = config.inference.context_size,
        threads = config.inference.thread_count,
        "configuration loaded"
    );

    if let Err(e) = GatewayServer::new(config).start().await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
