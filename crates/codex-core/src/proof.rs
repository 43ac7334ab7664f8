//! Integrity proofs: self-describing content-hash URIs.
//!
//! A proof has the form `ni://sha-256;<base64url(digest)>` so any
//! verifier can recover both the algorithm and the digest without
//! external context. It is computed once from the original payload
//! bytes and never recomputed afterward.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{b64url_decode, b64url_encode, Sha256Hash};
use crate::error::CoreError;

/// URI scheme for named-information integrity proofs.
pub const PROOF_SCHEME: &str = "ni";

/// The only hash algorithm this protocol generation emits.
pub const PROOF_ALGORITHM: &str = "sha-256";

/// A self-describing content-hash URI.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrityProof(String);

impl IntegrityProof {
    /// Encode a SHA-256 digest as a proof URI.
    pub fn from_digest(digest: &Sha256Hash) -> Self {
        Self(format!(
            "{}://{};{}",
            PROOF_SCHEME,
            PROOF_ALGORITHM,
            b64url_encode(digest.as_bytes())
        ))
    }

    /// Hash a payload and encode the proof in one step.
    pub fn compute(payload: &[u8]) -> Self {
        Self::from_digest(&Sha256Hash::hash(payload))
    }

    /// Parse a proof URI back into its algorithm name and digest.
    pub fn parse(&self) -> Result<(String, Vec<u8>), CoreError> {
        let rest = self
            .0
            .strip_prefix(&format!("{PROOF_SCHEME}://"))
            .ok_or_else(|| CoreError::InvalidProof(format!("bad scheme in '{}'", self.0)))?;
        let (alg, digest_b64) = rest
            .split_once(';')
            .ok_or_else(|| CoreError::InvalidProof(format!("missing ';' in '{}'", self.0)))?;
        if alg.is_empty() {
            return Err(CoreError::InvalidProof("empty algorithm name".into()));
        }
        let digest = b64url_decode(digest_b64)?;
        Ok((alg.to_string(), digest))
    }

    /// Check a payload against this proof.
    ///
    /// Errors on a malformed proof or an algorithm other than sha-256;
    /// returns false on a digest mismatch.
    pub fn matches(&self, payload: &[u8]) -> Result<bool, CoreError> {
        let (alg, digest) = self.parse()?;
        if alg != PROOF_ALGORITHM {
            return Err(CoreError::UnsupportedAlgorithm(alg));
        }
        Ok(digest == Sha256Hash::hash(payload).as_bytes())
    }

    /// The proof as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for IntegrityProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IntegrityProof({})", self.0)
    }
}

impl fmt::Display for IntegrityProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IntegrityProof {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_format() {
        // SHA-256 of the empty string, base64url encoded.
        let proof = IntegrityProof::compute(b"");
        assert_eq!(
            proof.as_str(),
            "ni://sha-256;47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU"
        );
    }

    #[test]
    fn test_proof_deterministic() {
        let p1 = IntegrityProof::compute(b"payload bytes");
        let p2 = IntegrityProof::compute(b"payload bytes");
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_parse_roundtrip() {
        let digest = Sha256Hash::hash(b"abc");
        let proof = IntegrityProof::from_digest(&digest);
        let (alg, parsed) = proof.parse().unwrap();
        assert_eq!(alg, "sha-256");
        assert_eq!(parsed, digest.as_bytes());
    }

    #[test]
    fn test_matches() {
        let proof = IntegrityProof::compute(b"hello");
        assert!(proof.matches(b"hello").unwrap());
        assert!(!proof.matches(b"goodbye").unwrap());
    }

    #[test]
    fn test_parse_rejects_bad_scheme() {
        let proof = IntegrityProof::from("sha256:deadbeef".to_string());
        assert!(proof.parse().is_err());
    }

    #[test]
    fn test_matches_rejects_unknown_algorithm() {
        let proof = IntegrityProof::from("ni://sha-512;AAAA".to_string());
        assert!(matches!(
            proof.matches(b"x"),
            Err(CoreError::UnsupportedAlgorithm(_))
        ));
    }
}
