//! Verification of sealed entries.
//!
//! Signature verification is majority-tolerant: the log records one
//! sealing event per mutation, so signatures computed against an
//! earlier canonical form are expected to stop verifying once storage
//! metadata lands. An entry is validly sealed if at least one
//! signature verifies against its present state.

use crate::canonical::canonical_entry_bytes;
use crate::crypto::{b64url_decode, EsPublicKey, EsSignature};
use crate::entry::CodexEntry;
use crate::error::CoreError;
use crate::proof::IntegrityProof;
use crate::seal::{jwk_from_kid, SIGNATURE_ALG};

/// Outcome of checking every record in an entry's signature log.
#[derive(Debug, Clone)]
pub struct SignatureReport {
    /// True when at least one signature verifies.
    pub valid: bool,
    /// Number of signatures that verify against the current canonical
    /// form.
    pub verified: usize,
    /// Total number of records in the log.
    pub total: usize,
    /// One message per record that failed, indexed for diagnostics.
    pub errors: Vec<String>,
}

/// Outcome of checking a payload against an entry's integrity proof.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub valid: bool,
    pub computed: IntegrityProof,
    pub expected: IntegrityProof,
}

/// Combined verification verdict for an entry and its payload.
#[derive(Debug, Clone)]
pub struct EntryReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub integrity: IntegrityReport,
    pub signatures: SignatureReport,
}

/// Verify every signature in the log against the entry's current
/// canonical form (the structure with `signatures` removed entirely).
pub fn verify_signatures(entry: &CodexEntry) -> Result<SignatureReport, CoreError> {
    let message = canonical_entry_bytes(entry)?;

    let total = entry.signatures.len();
    let mut verified = 0;
    let mut errors = Vec::new();

    if total == 0 {
        errors.push("entry has no signatures".to_string());
    }

    for (i, record) in entry.signatures.iter().enumerate() {
        if record.alg != SIGNATURE_ALG {
            errors.push(format!(
                "signature {i}: unsupported algorithm '{}', only {SIGNATURE_ALG} is supported",
                record.alg
            ));
            continue;
        }

        let result = verify_one(&record.kid, &record.signature, &message);
        match result {
            Ok(()) => verified += 1,
            Err(e) => errors.push(format!("signature {i}: {e}")),
        }
    }

    Ok(SignatureReport {
        valid: verified > 0,
        verified,
        total,
        errors,
    })
}

fn verify_one(kid: &str, signature_b64: &str, message: &[u8]) -> Result<(), CoreError> {
    let jwk = jwk_from_kid(kid)?;
    let public_key = EsPublicKey::from_jwk(&jwk)?;

    let sig_bytes = b64url_decode(signature_b64)?;
    let sig_arr: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| CoreError::InvalidSignature)?;

    public_key.verify(message, &EsSignature::from_bytes(sig_arr))
}

/// Check a payload against the entry's integrity proof.
///
/// Both proofs are reported so a mismatch renders with distinct
/// computed and expected hashes.
pub fn verify_payload_integrity(payload: &[u8], entry: &CodexEntry) -> IntegrityReport {
    let computed = IntegrityProof::compute(payload);
    let expected = entry.storage.integrity_proof.clone();
    IntegrityReport {
        valid: computed == expected,
        computed,
        expected,
    }
}

/// Verify a complete entry: payload integrity plus the signature log.
pub fn verify_entry(payload: &[u8], entry: &CodexEntry) -> Result<EntryReport, CoreError> {
    let integrity = verify_payload_integrity(payload, entry);
    let signatures = verify_signatures(entry)?;

    let mut errors = Vec::new();
    if !integrity.valid {
        errors.push(format!(
            "payload hash does not match integrity_proof: computed {}, expected {}",
            integrity.computed, integrity.expected
        ));
    }
    if !signatures.valid {
        errors.push(format!(
            "no signatures verified ({} of {}): {}",
            signatures.verified,
            signatures.total,
            signatures.errors.join("; ")
        ));
    }

    Ok(EntryReport {
        valid: errors.is_empty(),
        errors,
        integrity,
        signatures,
    })
}
