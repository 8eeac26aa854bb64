//! Command-line and environment overrides using clap

use crate::config::GatewayConfig;
use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// BitNet GGUF API Server - OpenAI-compatible endpoints for a local model
#[derive(Debug, Default, Parser)]
#[command(name = "bitnet-gateway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (.toml, .yaml, .yml or .json)
    #[arg(short = 'c', long, env = "BITNET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "BITNET_HOST")]
    pub host: Option<String>,

    /// TCP port to listen on
    #[arg(short, long, env = "BITNET_PORT")]
    pub port: Option<u16>,

    /// Path to the GGUF model file
    #[arg(long, env = "BITNET_MODEL_PATH")]
    pub model_path: Option<String>,

    /// Path to the llama-cli executable
    #[arg(long, env = "BITNET_BINARY_PATH")]
    pub binary_path: Option<String>,

    /// Default number of tokens to generate
    #[arg(long, env = "BITNET_MAX_TOKENS")]
    pub max_tokens: Option<u32>,

    /// Default sampling temperature
    #[arg(long, env = "BITNET_TEMPERATURE")]
    pub temperature: Option<f32>,

    /// Context window size
    #[arg(long, env = "BITNET_CONTEXT_SIZE")]
    pub context_size: Option<u32>,

    /// Threads per llama-cli process
    #[arg(long, env = "BITNET_THREADS")]
    pub threads: Option<u32>,

    /// Per-generation timeout in seconds
    #[arg(long, env = "BITNET_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Maximum number of llama-cli processes running at once
    #[arg(long, env = "BITNET_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,
}

impl Cli {
    /// Build the final configuration: defaults, then the config file, then
    /// environment and flags.
    pub fn resolve(&self) -> Result<GatewayConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => GatewayConfig::from_file(path)?,
            None => GatewayConfig::default(),
        };
        let resolved = self.apply(base);
        resolved.validate()?;
        Ok(resolved)
    }

    /// Overlay every option that was given onto `cfg`.
    pub fn apply(&self, mut cfg: GatewayConfig) -> GatewayConfig {
        if let Some(host) = &self.host {
            cfg.host = host.clone();
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }

        let inference = &mut cfg.inference;
        if let Some(path) = &self.model_path {
            inference.model_path = path.clone();
        }
        if let Some(path) = &self.binary_path {
            inference.binary_path = path.clone();
        }
        if let Some(n) = self.max_tokens {
            inference.max_tokens = n;
        }
        if let Some(t) = self.temperature {
            inference.temperature = t;
        }
        if let Some(n) = self.context_size {
            inference.context_size = n;
        }
        if let Some(n) = self.threads {
            inference.thread_count = n;
        }
        if let Some(secs) = self.timeout_secs {
            inference.timeout_secs = secs;
        }
        if let Some(limit) = self.max_concurrency {
            inference.max_concurrency = Some(limit);
        }
        cfg
    }
}
