//! Gateway configuration
//!
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional config file (TOML, YAML or JSON, chosen by extension),
//!    with `${VAR}` / `$VAR` references substituted from the environment
//! 3. `BITNET_*` environment variables
//! 4. command-line flags
//!
//! Layers 3 and 4 are both handled by [`crate::cli::Cli`]. The result is
//! validated once and is immutable afterwards.
//!
//! Example file:
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8936
//!
//! [inference]
//! model_path = "/models/BitNet-b1.58-2B-4T/ggml-model-i2_s.gguf"
//! binary_path = "/opt/bitnet/bin/llama-cli"
//! thread_count = 4
//! ```

use crate::error::ConfigError;
use bitnet_local_llm::InferenceConfig;
use config::{Config as Cfg, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static BRACED_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));
static BARE_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("valid regex"));

/// Runtime configuration for the gateway binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Interface to bind (default: `0.0.0.0`)
    pub host: String,
    /// TCP port to listen on (default: 8936)
    pub port: u16,
    /// Model, binary and generation defaults
    pub inference: InferenceConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8936,
            inference: InferenceConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load from a file, detecting the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = detect_format(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content, format)
    }

    /// Parse from a string in the given format. Keys absent from the
    /// document keep their defaults.
    pub fn from_str(content: &str, format: FileFormat) -> Result<Self, ConfigError> {
        let substituted = substitute_env_vars(content);
        Cfg::builder()
            .add_source(File::from_str(&substituted, format))
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "host".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        self.inference
            .validate()
            .map_err(|message| ConfigError::InvalidValue {
                key: "inference".to_string(),
                message: message.to_string(),
            })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Map a file extension to a `config` crate format.
pub fn detect_format(path: &Path) -> Result<FileFormat, ConfigError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("no file extension found".to_string()))?;

    match ext.to_lowercase().as_str() {
        "toml" => Ok(FileFormat::Toml),
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "json" => Ok(FileFormat::Json),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

/// Replace `${VAR}` and `$VAR` with environment values. Unset variables are
/// left as written.
pub fn substitute_env_vars(content: &str) -> String {
    let braced = BRACED_VAR.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    BARE_VAR
        .replace_all(&braced, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
