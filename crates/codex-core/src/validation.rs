//! Structural consistency checks for Codex entries.
//!
//! These checks guarantee an entry is well-formed enough to be
//! schema-validated by an external validator. They do not verify
//! signatures or payloads; see [`crate::verify`] for that.

use uuid::Uuid;

use crate::crypto::b64url_decode;
use crate::entry::{CodexEntry, ENTRY_VERSION};
use crate::error::ValidationError;
use crate::seal::{KID_PREFIX, SIGNATURE_ALG};

/// Validate an entry's structure.
///
/// This performs:
/// - Version check
/// - UUID id check
/// - Integrity proof parse
/// - Identity field presence
/// - Signature record shape (alg, kid prefix, base64url fields)
pub fn validate_entry_structure(entry: &CodexEntry) -> Result<(), ValidationError> {
    if entry.version != ENTRY_VERSION {
        return Err(ValidationError::UnsupportedVersion(entry.version.clone()));
    }

    if Uuid::parse_str(&entry.id).is_err() {
        return Err(ValidationError::InvalidId(entry.id.clone()));
    }

    entry
        .storage
        .integrity_proof
        .parse()
        .map_err(|e| ValidationError::InvalidProof(e.to_string()))?;

    if entry.identity.org.is_empty() {
        return Err(ValidationError::EmptyField("identity.org"));
    }
    if entry.identity.process.is_empty() {
        return Err(ValidationError::EmptyField("identity.process"));
    }
    if entry.identity.artifact.is_empty() {
        return Err(ValidationError::EmptyField("identity.artifact"));
    }

    if entry.anchor.chain.is_empty() {
        return Err(ValidationError::EmptyField("anchor.chain"));
    }
    if entry.anchor.hash_alg.is_empty() {
        return Err(ValidationError::EmptyField("anchor.hash_alg"));
    }

    for (index, record) in entry.signatures.iter().enumerate() {
        if record.alg != SIGNATURE_ALG {
            return Err(ValidationError::MalformedSignature {
                index,
                reason: format!("unsupported algorithm '{}'", record.alg),
            });
        }
        let encoded = record.kid.strip_prefix(KID_PREFIX).ok_or_else(|| {
            ValidationError::MalformedSignature {
                index,
                reason: format!("kid lacks '{KID_PREFIX}' prefix"),
            }
        })?;
        b64url_decode(encoded).map_err(|e| ValidationError::MalformedSignature {
            index,
            reason: format!("kid is not base64url: {e}"),
        })?;
        b64url_decode(&record.signature).map_err(|e| ValidationError::MalformedSignature {
            index,
            reason: format!("signature is not base64url: {e}"),
        })?;
    }

    Ok(())
}
