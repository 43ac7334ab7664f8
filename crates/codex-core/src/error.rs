//! Error types for codex-core.

use thiserror::Error;

/// Errors from core entry, codec, and signing operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signing seed")]
    InvalidSeed,

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid key id: {0}")]
    InvalidKeyId(String),

    #[error("invalid integrity proof: {0}")]
    InvalidProof(String),

    #[error("base64url decoding failed: {0}")]
    Base64(String),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Structural validation errors for Codex entries.
///
/// These cover local consistency only. Schema validation against the
/// published schema document is an external collaborator's job.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported entry version: {0}")]
    UnsupportedVersion(String),

    #[error("entry id is not a valid UUID: {0}")]
    InvalidId(String),

    #[error("invalid integrity proof: {0}")]
    InvalidProof(String),

    #[error("empty required field: {0}")]
    EmptyField(&'static str),

    #[error("malformed signature at index {index}: {reason}")]
    MalformedSignature { index: usize, reason: String },

    #[error("structural error: {0}")]
    StructuralError(String),
}

impl From<CoreError> for ValidationError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidProof(msg) => ValidationError::InvalidProof(msg),
            other => ValidationError::StructuralError(other.to_string()),
        }
    }
}
