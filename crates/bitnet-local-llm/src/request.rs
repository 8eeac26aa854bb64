//! Per-call generation parameters

use crate::config::InferenceConfig;

/// One generation job. Built fresh for every HTTP call and never mutated.
///
/// Construction always yields a valid request: overrides that are out of
/// range fall back to, or are clamped against, the configured defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    thread_count: u32,
    context_size: u32,
}

impl GenerationRequest {
    /// Start from the configured defaults.
    pub fn new(prompt: impl Into<String>, config: &InferenceConfig) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: config.max_tokens.max(1),
            temperature: config.temperature,
            thread_count: config.thread_count.max(1),
            context_size: config.context_size.max(1),
        }
    }

    /// Override the token budget. `None` and `Some(0)` keep the default.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        if let Some(n) = max_tokens.filter(|n| *n > 0) {
            self.max_tokens = n;
        }
        self
    }

    /// Override the sampling temperature. Non-finite values keep the
    /// default; finite ones are clamped into `0.0..=2.0`.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        if let Some(t) = temperature.filter(|t| t.is_finite()) {
            self.temperature = t.clamp(0.0, 2.0);
        }
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn thread_count(&self) -> u32 {
        self.thread_count
    }

    pub fn context_size(&self) -> u32 {
        self.context_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_config() {
        let cfg = InferenceConfig::default();
        let req = GenerationRequest::new("user: hi", &cfg);
        assert_eq!(req.prompt(), "user: hi");
        assert_eq!(req.max_tokens(), 50);
        assert_eq!(req.temperature(), 0.8);
        assert_eq!(req.thread_count(), 2);
        assert_eq!(req.context_size(), 2048);
    }

    #[test]
    fn test_overrides() {
        let cfg = InferenceConfig::default();
        let req = GenerationRequest::new("p", &cfg)
            .with_max_tokens(Some(128))
            .with_temperature(Some(0.2));
        assert_eq!(req.max_tokens(), 128);
        assert_eq!(req.temperature(), 0.2);
    }

    #[test]
    fn test_zero_tokens_keeps_default() {
        let cfg = InferenceConfig::default();
        let req = GenerationRequest::new("p", &cfg).with_max_tokens(Some(0));
        assert_eq!(req.max_tokens(), 50);
    }

    #[test]
    fn test_temperature_clamped_and_nan_ignored() {
        let cfg = InferenceConfig::default();
        let hot = GenerationRequest::new("p", &cfg).with_temperature(Some(9.0));
        assert_eq!(hot.temperature(), 2.0);
        let cold = GenerationRequest::new("p", &cfg).with_temperature(Some(-1.0));
        assert_eq!(cold.temperature(), 0.0);
        let nan = GenerationRequest::new("p", &cfg).with_temperature(Some(f32::NAN));
        assert_eq!(nan.temperature(), 0.8);
    }
}
