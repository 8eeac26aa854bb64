//! Provenance records attached to every response
//!
//! A [`ProvenanceArtifact`] is an audit record: SHA-256 digests of the prompt
//! and the response, the model id, a timestamp and whether real inference
//! ran. It is serialized to JSON and base64-encoded so it fits in a single
//! string field. It is not a zero-knowledge proof and carries no
//! cryptographic guarantee; `verification_tag` is a fixed marker that must
//! not be treated as a signature.

use crate::error::ProvenanceError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Marker stored in every artifact. Not verifiable.
pub const VERIFICATION_TAG: &str = "mock_proof";

/// Backend recorded when no inference engine ran.
pub const NO_BACKEND: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofType {
    /// Text came from the model
    RealInference,
    /// Text is the canned fallback reply
    Fallback,
}

/// Decoded form of the `zkml_proof` response field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceArtifact {
    pub proof_type: ProofType,
    pub model_id: String,
    pub prompt_digest: String,
    pub response_digest: String,
    pub created_at: i64,
    pub backend: String,
    pub verification_tag: String,
}

impl ProvenanceArtifact {
    /// JSON, then standard base64.
    pub fn encode(&self) -> String {
        // Serializing a struct of strings and integers cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        STANDARD.encode(json)
    }

    pub fn decode(encoded: &str) -> Result<Self, ProvenanceError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn is_fallback(&self) -> bool {
        self.proof_type == ProofType::Fallback
    }
}

/// Lowercase hex SHA-256 of `text` (64 characters).
pub fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Builds provenance artifacts for one model/engine pair.
#[derive(Debug, Clone)]
pub struct ProvenanceBuilder {
    model_id: String,
    engine: String,
}

impl ProvenanceBuilder {
    pub fn new(model_id: impl Into<String>, engine: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            engine: engine.into(),
        }
    }

    /// Build the artifact structure, timestamped now.
    pub fn artifact(&self, prompt: &str, response: &str, fallback: bool) -> ProvenanceArtifact {
        let (proof_type, backend) = if fallback {
            (ProofType::Fallback, NO_BACKEND.to_string())
        } else {
            (ProofType::RealInference, self.engine.clone())
        };

        ProvenanceArtifact {
            proof_type,
            model_id: self.model_id.clone(),
            prompt_digest: digest(prompt),
            response_digest: digest(response),
            created_at: chrono::Utc::now().timestamp(),
            backend,
            verification_tag: VERIFICATION_TAG.to_string(),
        }
    }

    /// Build and transport-encode an artifact.
    pub fn build(&self, prompt: &str, response: &str, fallback: bool) -> String {
        self.artifact(prompt, response, fallback).encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> ProvenanceBuilder {
        ProvenanceBuilder::new("BitNet-b1.58-2B-4T", "risc0")
    }

    #[test]
    fn test_digest_format() {
        let d = digest("hello");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(
            d,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_decoded_digests_match_independent_digests() {
        let encoded = builder().build("user: hello", "Hi there.", false);
        let artifact = ProvenanceArtifact::decode(&encoded).expect("decode");
        assert_eq!(artifact.prompt_digest, digest("user: hello"));
        assert_eq!(artifact.response_digest, digest("Hi there."));
        assert_eq!(artifact.proof_type, ProofType::RealInference);
        assert_eq!(artifact.backend, "risc0");
        assert_eq!(artifact.model_id, "BitNet-b1.58-2B-4T");
        assert_eq!(artifact.verification_tag, VERIFICATION_TAG);
    }

    #[test]
    fn test_fallback_sets_type_and_backend() {
        let artifact = ProvenanceArtifact::decode(&builder().build("p", "r", true)).unwrap();
        assert!(artifact.is_fallback());
        assert_eq!(artifact.backend, NO_BACKEND);
    }

    #[test]
    fn test_digests_deterministic_modulo_timestamp() {
        let a = builder().artifact("same", "same reply", false);
        let mut b = builder().artifact("same", "same reply", false);
        b.created_at = a.created_at;
        assert_eq!(a, b);
    }

    #[test]
    fn test_wire_field_names() {
        let encoded = builder().build("p", "r", true);
        let bytes = STANDARD.decode(encoded).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["proof_type"], "fallback");
        assert_eq!(value["backend"], "none");
        assert!(value["created_at"].is_i64());
        assert!(value["prompt_digest"].is_string());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            ProvenanceArtifact::decode("%%%"),
            Err(ProvenanceError::Encoding(_))
        ));
        let not_json = STANDARD.encode("not json");
        assert!(matches!(
            ProvenanceArtifact::decode(&not_json),
            Err(ProvenanceError::Json(_))
        ));
    }
}
