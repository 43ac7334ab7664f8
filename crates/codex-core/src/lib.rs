//! # Codex Core
//!
//! Pure primitives for Codex provenance entries: the data model,
//! canonical JSON, integrity proofs, and ES256 sealing/verification.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`CodexEntry`] - The provenance record
//! - [`IntegrityProof`] - Self-describing content-hash URI
//! - [`EsKeypair`] - ES256 (ECDSA P-256) signing key
//! - [`KeyManager`] - External key-management boundary
//!
//! ## Canonicalization
//!
//! Entries are signed and verified over canonical JSON with the
//! `signatures` field removed. See [`canonical`].

pub mod canonical;
pub mod crypto;
pub mod entry;
pub mod error;
pub mod proof;
pub mod seal;
pub mod validation;
pub mod verify;

pub use canonical::{canonical_entry_bytes, canonicalize};
pub use crypto::{b64url_decode, b64url_encode, EsKeypair, EsPublicKey, EsSignature, Sha256Hash};
pub use entry::{
    Anchor, CodexEntry, EntryBuilder, Identity, SignatureRecord, StorageInfo, StorageProtocol,
    StorageUpdate, BINARY_PROCESS_TAG, DEFAULT_ORG, ENTRY_VERSION,
};
pub use error::{CoreError, ValidationError};
pub use proof::{IntegrityProof, PROOF_ALGORITHM, PROOF_SCHEME};
pub use seal::{jwk_from_kid, kid_for_jwk, seal_entry, KeyManager, KID_PREFIX, SIGNATURE_ALG};
pub use validation::validate_entry_structure;
pub use verify::{
    verify_entry, verify_payload_integrity, verify_signatures, EntryReport, IntegrityReport,
    SignatureReport,
};
