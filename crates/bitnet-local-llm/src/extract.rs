//! Recovering generated text from `llama-cli` stdout
//!
//! llama.cpp interleaves its own diagnostics (loader tags, sampling dumps,
//! system banners) with the generated text. The filter here is a substring
//! deny-list tuned to that output, not a grammar. It sits behind
//! [`OutputExtractor`] so the rules can change without touching the
//! orchestrator.
//!
//! Known false positive: a generated line that happens to contain a
//! denied substring (say, a reply mentioning `system_info`) is dropped.

/// Text returned when nothing survives filtering.
pub const DEFAULT_RESPONSE: &str =
    "I'm a BitNet AI assistant. I'm processing your request using the BitNet 1.58b GGUF model.";

/// Substrings marking llama.cpp diagnostic lines.
pub const DEFAULT_DENY_MARKERS: &[&str] = &["llama_", "main:", "sampling", "system_info"];

/// Turns raw process output into response text.
///
/// Implementations must be pure and total, and must never return an empty
/// string.
pub trait OutputExtractor: Send + Sync {
    fn clean(&self, raw: &str) -> String;
}

/// Deny-list extractor for llama.cpp output.
#[derive(Debug, Clone)]
pub struct LlamaOutputExtractor {
    deny_markers: Vec<String>,
    default_response: String,
}

impl Default for LlamaOutputExtractor {
    fn default() -> Self {
        Self {
            deny_markers: DEFAULT_DENY_MARKERS.iter().map(|m| m.to_string()).collect(),
            default_response: DEFAULT_RESPONSE.to_string(),
        }
    }
}

impl LlamaOutputExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the deny-list.
    pub fn with_deny_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny_markers = markers
            .into_iter()
            .map(Into::into)
            .filter(|m: &String| !m.is_empty())
            .collect();
        self
    }

    /// Replace the text used when extraction finds nothing. A blank value is
    /// ignored so the non-empty guarantee holds.
    pub fn with_default_response(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.default_response = text.trim().to_string();
        }
        self
    }

    fn is_diagnostic(&self, line: &str) -> bool {
        self.deny_markers.iter().any(|m| line.contains(m.as_str()))
    }
}

impl OutputExtractor for LlamaOutputExtractor {
    fn clean(&self, raw: &str) -> String {
        let mut kept: Vec<&str> = Vec::new();
        let mut started = false;

        for line in raw.lines() {
            if self.is_diagnostic(line) {
                continue;
            }
            if !started {
                if line.trim().is_empty() {
                    continue;
                }
                started = true;
            }
            // Blank lines inside the body keep paragraph breaks.
            kept.push(line);
        }

        let text = kept.join("\n");
        let text = text.trim();
        if text.is_empty() {
            self.default_response.clone()
        } else {
            text.to_string()
        }
    }
}
