//! Cryptographic primitives for Codex entries.
//!
//! Wraps SHA-256 hashing and ES256 (ECDSA P-256, SHA-256 digest)
//! signing with strong types. Public keys travel as JWKs embedded in
//! signature key ids, signatures as raw r||s bytes.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::CoreError;

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&digest);
        Self(arr)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A P-256 public key used to verify ES256 signatures.
#[derive(Clone, PartialEq, Eq)]
pub struct EsPublicKey(VerifyingKey);

impl EsPublicKey {
    /// Verify an ES256 signature over a message.
    pub fn verify(&self, message: &[u8], signature: &EsSignature) -> Result<(), CoreError> {
        let sig = Signature::from_slice(&signature.0).map_err(|_| CoreError::InvalidSignature)?;
        self.0
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }

    /// Export as a JWK JSON string (kty/crv/x/y members only).
    pub fn to_jwk(&self) -> String {
        p256::PublicKey::from(&self.0).to_jwk_string()
    }

    /// Import from a JWK JSON string.
    ///
    /// Tolerates extra members (WebCrypto exports carry `ext` and
    /// `key_ops`); only kty/crv/x/y are considered.
    pub fn from_jwk(jwk_json: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value = serde_json::from_str(jwk_json)
            .map_err(|e| CoreError::InvalidPublicKey(format!("JWK is not JSON: {e}")))?;
        let obj = value
            .as_object()
            .ok_or_else(|| CoreError::InvalidPublicKey("JWK is not an object".into()))?;

        let mut filtered = serde_json::Map::new();
        for key in ["kty", "crv", "x", "y"] {
            if let Some(v) = obj.get(key) {
                filtered.insert(key.to_string(), v.clone());
            }
        }
        let filtered = serde_json::Value::Object(filtered).to_string();

        let public_key = p256::PublicKey::from_jwk_str(&filtered)
            .map_err(|e| CoreError::InvalidPublicKey(e.to_string()))?;
        Ok(Self(VerifyingKey::from(&public_key)))
    }
}

impl fmt::Debug for EsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EsPublicKey(P-256)")
    }
}

/// A 64-byte raw ES256 signature (r || s).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EsSignature(pub [u8; 64]);

impl EsSignature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for EsSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EsSignature({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for EsSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An ES256 keypair for sealing entries.
///
/// Wraps p256's SigningKey. Signing is deterministic (RFC 6979).
#[derive(Clone)]
pub struct EsKeypair {
    signing_key: SigningKey,
}

impl EsKeypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from a 32-byte seed (the raw P-256 scalar).
    ///
    /// Fails if the seed is zero or not a valid field element.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CoreError> {
        let signing_key =
            SigningKey::from_bytes(&(*seed).into()).map_err(|_| CoreError::InvalidSeed)?;
        Ok(Self { signing_key })
    }

    /// Get the public key.
    pub fn public_key(&self) -> EsPublicKey {
        EsPublicKey(VerifyingKey::from(&self.signing_key))
    }

    /// Sign a message, producing raw r||s bytes.
    pub fn sign(&self, message: &[u8]) -> EsSignature {
        let sig: Signature = self.signing_key.sign(message);
        let bytes = sig.to_bytes();
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        EsSignature(arr)
    }
}

impl fmt::Debug for EsKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EsKeypair({:?})", self.public_key())
    }
}

/// Encode bytes as unpadded base64url.
pub fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode base64url, tolerating trailing padding.
pub fn b64url_decode(s: &str) -> Result<Vec<u8>, CoreError> {
    URL_SAFE_NO_PAD
        .decode(s.trim_end_matches('='))
        .map_err(|e| CoreError::Base64(e.to_string()))
}
