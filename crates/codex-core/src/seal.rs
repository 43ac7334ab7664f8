//! Sealing: appending ES256 signatures to an entry's log.
//!
//! The signing key lives behind the [`KeyManager`] trait; this module
//! never generates or stores keys on the signer's behalf.

use crate::canonical::canonical_entry_bytes;
use crate::crypto::{b64url_decode, b64url_encode, EsKeypair, EsSignature};
use crate::entry::{CodexEntry, SignatureRecord};
use crate::error::CoreError;

/// The only signature algorithm this protocol generation emits.
pub const SIGNATURE_ALG: &str = "ES256";

/// Prefix marking a key id as an embedded JWK.
pub const KID_PREFIX: &str = "jwk:";

/// External key-management boundary: signs canonical bytes under
/// ES256/P-256 and exposes the corresponding public key as a JWK.
pub trait KeyManager: Send + Sync {
    /// Sign a message, returning raw r||s signature bytes.
    fn sign(&self, message: &[u8]) -> Result<EsSignature, CoreError>;

    /// The public key as a JWK JSON string.
    fn public_key_jwk(&self) -> String;
}

impl KeyManager for EsKeypair {
    fn sign(&self, message: &[u8]) -> Result<EsSignature, CoreError> {
        Ok(EsKeypair::sign(self, message))
    }

    fn public_key_jwk(&self) -> String {
        self.public_key().to_jwk()
    }
}

/// Build the key id for a JWK JSON string.
pub fn kid_for_jwk(jwk_json: &str) -> String {
    format!("{KID_PREFIX}{}", b64url_encode(jwk_json.as_bytes()))
}

/// Recover the JWK JSON embedded in a key id.
pub fn jwk_from_kid(kid: &str) -> Result<String, CoreError> {
    let encoded = kid
        .strip_prefix(KID_PREFIX)
        .ok_or_else(|| CoreError::InvalidKeyId(format!("expected '{KID_PREFIX}' prefix")))?;
    let bytes = b64url_decode(encoded)?;
    String::from_utf8(bytes).map_err(|_| CoreError::InvalidKeyId("kid is not UTF-8 JSON".into()))
}

/// Seal an entry: sign its canonical bytes as they stand at call time
/// and append the resulting signature record.
///
/// The canonical form excludes the `signatures` field entirely, so a
/// record appended here verifies against the same bytes the verifier
/// computes. Every call appends exactly one record; the log is never
/// truncated or reordered.
pub fn seal_entry(entry: &mut CodexEntry, keys: &dyn KeyManager) -> Result<(), CoreError> {
    let message = canonical_entry_bytes(entry)?;
    let signature = keys.sign(&message)?;
    let jwk = keys.public_key_jwk();

    entry.signatures.push(SignatureRecord {
        alg: SIGNATURE_ALG.to_string(),
        kid: kid_for_jwk(&jwk),
        signature: b64url_encode(signature.as_bytes()),
    });
    Ok(())
}
