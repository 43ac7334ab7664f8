//! The Codex entry: a tamper-evident provenance record.
//!
//! An entry is created unsigned, sealed with a first signature, and
//! may be mutated once with storage metadata and resealed. The
//! signature log is append-only; there is no transition back to the
//! unsigned state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::error::CoreError;
use crate::proof::IntegrityProof;
use crate::seal::{seal_entry, KeyManager};

/// The current entry schema version.
pub const ENTRY_VERSION: &str = "0.0.2";

/// Default organization recorded in entry identities.
pub const DEFAULT_ORG: &str = "Codex Forge";

/// Process tag for payloads with no text classification.
pub const BINARY_PROCESS_TAG: &str = "binary-upload";

/// Where the sealed archive is (or will be) persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageProtocol {
    #[serde(rename = "gdrive")]
    GDrive,
    #[serde(rename = "local")]
    Local,
}

impl fmt::Display for StorageProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageProtocol::GDrive => write!(f, "gdrive"),
            StorageProtocol::Local => write!(f, "local"),
        }
    }
}

/// Storage metadata: protocol, eventual location, and the invariant
/// integrity proof of the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub protocol: StorageProtocol,

    /// URI of the persisted artifact. Absent until persistence
    /// completes; set at most once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Content hash of the original payload bytes. Set exactly once,
    /// before any signature, and never recomputed.
    pub integrity_proof: IntegrityProof,
}

/// Who and what produced the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub org: String,

    /// Short machine-generated tag classifying the artifact.
    pub process: String,

    /// Original filename of the artifact.
    pub artifact: String,

    /// Short human-readable summary, when one could be derived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// An external (or local) reference point for the sealing event.
///
/// Produced once and treated as immutable input to entry
/// construction; only `tx` and `url` may be refreshed when
/// persistence completes after initial signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub chain: String,
    pub tx: String,
    pub hash_alg: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Unix milliseconds, when the anchor source supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// One sealing event in the append-only signature log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Signature algorithm; this protocol generation emits "ES256".
    pub alg: String,

    /// Key id: "jwk:" + base64url(utf8(public-key JWK JSON)).
    pub kid: String,

    /// base64url(raw ECDSA r||s signature bytes).
    pub signature: String,
}

/// The provenance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodexEntry {
    /// Globally unique identifier, generated once, immutable.
    pub id: String,

    /// Schema version string.
    pub version: String,

    pub storage: StorageInfo,
    pub identity: Identity,
    pub anchor: Anchor,

    /// Append-only log of sealing events. Never truncated or
    /// reordered.
    pub signatures: Vec<SignatureRecord>,

    /// Caller-supplied attribution, opaque to the core.
    #[serde(rename = "createdBy", skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Value>,

    /// Causal link to a prior entry. Supported by the schema, not
    /// populated by this pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,
}

impl CodexEntry {
    /// Whether at least one sealing event has been recorded.
    pub fn is_sealed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Copy of this entry with `storage.location` removed.
    ///
    /// This is the entry's state at the moment the payload hash was
    /// fixed, used for deterministic archive construction.
    pub fn without_location(&self) -> CodexEntry {
        let mut reduced = self.clone();
        reduced.storage.location = None;
        reduced
    }

    /// Set any provided storage/anchor fields and append a fresh
    /// signature covering the mutated state. No-op fields are left
    /// untouched.
    pub fn update_storage(
        &mut self,
        update: StorageUpdate,
        keys: &dyn KeyManager,
    ) -> Result<(), CoreError> {
        if let Some(location) = update.location {
            self.storage.location = Some(location);
        }
        if let Some(tx) = update.tx {
            self.anchor.tx = tx;
        }
        if let Some(url) = update.url {
            self.anchor.url = Some(url);
        }
        seal_entry(self, keys)
    }
}

/// Storage metadata applied after external persistence completes.
#[derive(Debug, Clone, Default)]
pub struct StorageUpdate {
    pub location: Option<String>,
    pub tx: Option<String>,
    pub url: Option<String>,
}

/// Builder for unsigned Codex entries.
///
/// Fails only on missing required fields; that is a caller contract
/// violation, not a runtime condition to recover from.
pub struct EntryBuilder {
    id: Option<String>,
    integrity_proof: Option<IntegrityProof>,
    org: String,
    process: Option<String>,
    artifact: Option<String>,
    subject: Option<String>,
    anchor: Option<Anchor>,
    created_by: Option<Value>,
    protocol: StorageProtocol,
}

impl EntryBuilder {
    /// Start building an entry.
    pub fn new() -> Self {
        Self {
            id: None,
            integrity_proof: None,
            org: DEFAULT_ORG.to_string(),
            process: None,
            artifact: None,
            subject: None,
            anchor: None,
            created_by: None,
            protocol: StorageProtocol::GDrive,
        }
    }

    /// Set the entry id. A fresh UUIDv4 is generated when omitted.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the payload integrity proof (required).
    pub fn integrity_proof(mut self, proof: IntegrityProof) -> Self {
        self.integrity_proof = Some(proof);
        self
    }

    /// Override the organization.
    pub fn org(mut self, org: impl Into<String>) -> Self {
        self.org = org.into();
        self
    }

    /// Set the process classification tag (required).
    pub fn process(mut self, process: impl Into<String>) -> Self {
        self.process = Some(process.into());
        self
    }

    /// Set the artifact filename (required).
    pub fn artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    /// Set the human-readable subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the anchor (required).
    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Attach caller attribution.
    pub fn created_by(mut self, created_by: Value) -> Self {
        self.created_by = Some(created_by);
        self
    }

    /// Set the storage protocol.
    pub fn protocol(mut self, protocol: StorageProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Assemble the unsigned entry: `storage.location` absent,
    /// `signatures` present but empty.
    pub fn build(self) -> Result<CodexEntry, CoreError> {
        let integrity_proof = self
            .integrity_proof
            .ok_or(CoreError::MissingField("integrity_proof"))?;
        let process = self.process.ok_or(CoreError::MissingField("process"))?;
        let artifact = self.artifact.ok_or(CoreError::MissingField("artifact"))?;
        let anchor = self.anchor.ok_or(CoreError::MissingField("anchor"))?;

        Ok(CodexEntry {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            version: ENTRY_VERSION.to_string(),
            storage: StorageInfo {
                protocol: self.protocol,
                location: None,
                integrity_proof,
            },
            identity: Identity {
                org: self.org,
                process,
                artifact,
                subject: self.subject,
            },
            anchor,
            signatures: Vec::new(),
            created_by: self.created_by,
            previous_id: None,
        })
    }
}

impl Default for EntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EsKeypair;

    fn test_anchor() -> Anchor {
        Anchor {
            chain: "mock:local".to_string(),
            tx: "tx-1".to_string(),
            hash_alg: "sha-256".to_string(),
            url: None,
            timestamp: None,
        }
    }

    fn test_entry() -> CodexEntry {
        EntryBuilder::new()
            .integrity_proof(IntegrityProof::compute(b"payload"))
            .process("test-process")
            .artifact("test.txt")
            .anchor(test_anchor())
            .protocol(StorageProtocol::Local)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let entry = test_entry();
        assert_eq!(entry.version, ENTRY_VERSION);
        assert_eq!(entry.identity.org, DEFAULT_ORG);
        assert!(entry.storage.location.is_none());
        assert!(entry.signatures.is_empty());
        assert!(!entry.is_sealed());
        assert!(Uuid::parse_str(&entry.id).is_ok());
    }

    #[test]
    fn test_builder_missing_required_fields() {
        let err = EntryBuilder::new()
            .process("p")
            .artifact("a")
            .anchor(test_anchor())
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingField("integrity_proof")));

        let err = EntryBuilder::new()
            .integrity_proof(IntegrityProof::compute(b"x"))
            .artifact("a")
            .anchor(test_anchor())
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingField("process")));
    }

    #[test]
    fn test_absent_fields_not_serialized() {
        let entry = test_entry();
        let json = serde_json::to_value(&entry).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("createdBy"));
        assert!(!obj.contains_key("previous_id"));
        assert!(!obj["storage"].as_object().unwrap().contains_key("location"));
        // The empty signature log is explicitly present.
        assert_eq!(json["signatures"], serde_json::json!([]));
    }

    #[test]
    fn test_update_storage_sets_fields_and_seals() {
        let keys = EsKeypair::generate();
        let mut entry = test_entry();

        entry
            .update_storage(
                StorageUpdate {
                    location: Some("https://drive.google.com/file/d/abc".to_string()),
                    tx: Some("abc".to_string()),
                    url: None,
                },
                &keys,
            )
            .unwrap();

        assert_eq!(
            entry.storage.location.as_deref(),
            Some("https://drive.google.com/file/d/abc")
        );
        assert_eq!(entry.anchor.tx, "abc");
        // url was a no-op field and stays untouched.
        assert!(entry.anchor.url.is_none());
        assert_eq!(entry.signatures.len(), 1);
    }

    #[test]
    fn test_without_location() {
        let keys = EsKeypair::generate();
        let mut entry = test_entry();
        entry
            .update_storage(
                StorageUpdate {
                    location: Some("somewhere".to_string()),
                    ..Default::default()
                },
                &keys,
            )
            .unwrap();

        let reduced = entry.without_location();
        assert!(reduced.storage.location.is_none());
        // Everything else carries over, including the signature log.
        assert_eq!(reduced.signatures, entry.signatures);
        assert_eq!(reduced.id, entry.id);
    }

    #[test]
    fn test_protocol_serialization() {
        assert_eq!(
            serde_json::to_string(&StorageProtocol::GDrive).unwrap(),
            r#""gdrive""#
        );
        assert_eq!(
            serde_json::to_string(&StorageProtocol::Local).unwrap(),
            r#""local""#
        );
    }

    #[test]
    fn test_entry_json_roundtrip() {
        let entry = test_entry();
        let json = serde_json::to_string(&entry).unwrap();
        let back: CodexEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
