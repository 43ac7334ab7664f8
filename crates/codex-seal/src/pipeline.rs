//! The end-to-end sealing pipeline.
//!
//! One call takes payload bytes and a filename to a sealed, packaged,
//! validated Codex entry. Steps run strictly in order; a failure at
//! any step aborts the run with a [`SealError`] naming the step, and
//! no partial entry is ever returned as success.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use uuid::Uuid;

use codex_anchor::{AnchorContext, AnchorProvider, LocalAnchor};
use codex_archive::pack;
use codex_core::{
    CodexEntry, EntryBuilder, IntegrityProof, KeyManager, StorageUpdate, BINARY_PROCESS_TAG,
    DEFAULT_ORG,
};

use crate::classify::{is_text_artifact, ContentClassifier};
use crate::error::SealError;
use crate::store::{CredentialStore, ObjectStore, ObjectStoreError, RemoteObject};
use crate::validate::{EntryValidator, StructuralValidator, ValidationReport};

/// Archive password used when the caller supplies no sealer identity.
pub const DEFAULT_ARCHIVE_PASSWORD: &str = "mock";

/// Suffix of the persisted archive object's name.
const ARCHIVE_SUFFIX: &str = ".zip";

/// Suffix of the persisted standalone entry object's name.
const ENTRY_SUFFIX: &str = ".codex.json";

/// Which anchor source a sealing run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSelection {
    /// Offline run: local anchor, nothing persisted.
    Local,
    /// Anchored run: external anchor, archive and entry persisted.
    External,
}

/// Pipeline-level configuration.
#[derive(Debug, Clone)]
pub struct SealConfig {
    /// Organization recorded in every entry's identity.
    pub org: String,

    /// Archive password when no sealer identity is supplied.
    pub default_password: String,
}

impl Default for SealConfig {
    fn default() -> Self {
        Self {
            org: DEFAULT_ORG.to_string(),
            default_password: DEFAULT_ARCHIVE_PASSWORD.to_string(),
        }
    }
}

/// One sealing request.
#[derive(Debug, Clone)]
pub struct SealRequest {
    pub payload: Bytes,

    /// Original filename of the payload; becomes the artifact name
    /// and the payload's name inside the archive.
    pub filename: String,

    pub anchor: AnchorSelection,

    /// Opaque caller attribution embedded in the entry.
    pub created_by: Option<Value>,

    /// Identity string used as the archive password for anchored
    /// runs. Local runs always use the configured default.
    pub sealer_identity: Option<String>,
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct SealOutcome {
    /// The final entry, carrying every signature accumulated during
    /// the run.
    pub entry: CodexEntry,

    /// The packaged archive blob.
    pub archive: Vec<u8>,

    /// Remote identity of the persisted archive, for anchored runs.
    pub remote: Option<RemoteObject>,

    /// Remote identity of the persisted standalone entry.
    pub entry_remote: Option<RemoteObject>,

    /// The validator's verdict on the final entry. An invalid verdict
    /// is data, not an error; the caller decides what to do with it.
    pub validation: ValidationReport,
}

/// The external persistence stack for anchored runs.
struct ExternalStack {
    anchor: Arc<dyn AnchorProvider>,
    store: Arc<dyn ObjectStore>,
    credentials: Arc<dyn CredentialStore>,
}

/// The sealing orchestrator.
///
/// Collaborators are injected as trait objects; the pipeline owns
/// only the control flow.
pub struct SealPipeline {
    keys: Arc<dyn KeyManager>,
    config: SealConfig,
    classifier: Option<Arc<dyn ContentClassifier>>,
    validator: Arc<dyn EntryValidator>,
    external: Option<ExternalStack>,
}

impl SealPipeline {
    /// A pipeline with the given signing keys, structural validation,
    /// no classifier, and no external stack.
    pub fn new(keys: Arc<dyn KeyManager>, config: SealConfig) -> Self {
        Self {
            keys,
            config,
            classifier: None,
            validator: Arc::new(StructuralValidator),
            external: None,
        }
    }

    /// Enable anchored runs against the given anchor source and
    /// object store.
    pub fn with_external(
        mut self,
        anchor: Arc<dyn AnchorProvider>,
        store: Arc<dyn ObjectStore>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        self.external = Some(ExternalStack {
            anchor,
            store,
            credentials,
        });
        self
    }

    /// Enable content classification for text-like payloads.
    pub fn with_classifier(mut self, classifier: Arc<dyn ContentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Replace the default structural validator.
    pub fn with_validator(mut self, validator: Arc<dyn EntryValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Run the full pipeline for one payload.
    pub async fn seal(&self, request: SealRequest) -> Result<SealOutcome, SealError> {
        let entry_id = Uuid::new_v4().to_string();
        tracing::info!(
            entry_id = %entry_id,
            filename = %request.filename,
            payload_len = request.payload.len(),
            anchor = ?request.anchor,
            "sealing run started"
        );

        // 1. Hash the payload and classify its content.
        let integrity_proof = IntegrityProof::compute(&request.payload);
        let (process, subject) = self.classify(&request).await?;

        // 2. Acquire an anchor for the entry under construction.
        let ctx = AnchorContext {
            entry_id: entry_id.clone(),
            integrity_proof: integrity_proof.clone(),
        };
        let (anchor, protocol) = match request.anchor {
            AnchorSelection::Local => (LocalAnchor.acquire(&ctx).await?, LocalAnchor.protocol()),
            AnchorSelection::External => {
                let external = self.external()?;
                (
                    external.anchor.acquire(&ctx).await?,
                    external.anchor.protocol(),
                )
            }
        };

        // 3. Build the unsigned entry.
        let mut builder = EntryBuilder::new()
            .id(entry_id.clone())
            .integrity_proof(integrity_proof)
            .org(self.config.org.clone())
            .process(process)
            .artifact(request.filename.clone())
            .anchor(anchor)
            .protocol(protocol);
        if let Some(subject) = subject {
            builder = builder.subject(subject);
        }
        if let Some(created_by) = request.created_by.clone() {
            builder = builder.created_by(created_by);
        }
        let mut entry = builder.build()?;

        // 4. First seal.
        codex_core::seal_entry(&mut entry, &*self.keys)?;

        // 5. Package the archive. The payload is always encrypted;
        // anchored runs may use the sealer identity as the password.
        let password = match request.anchor {
            AnchorSelection::Local => self.config.default_password.as_str(),
            AnchorSelection::External => request
                .sealer_identity
                .as_deref()
                .unwrap_or(&self.config.default_password),
        };
        let archive = pack(&request.payload, &request.filename, &entry, Some(password))?;

        // 6-8. Persist, fold storage metadata back in, reseal, and
        // persist the final entry. Local runs skip all three.
        let (remote, entry_remote) = match request.anchor {
            AnchorSelection::Local => (None, None),
            AnchorSelection::External => {
                let external = self.external()?;

                let archive_name = format!("{entry_id}{ARCHIVE_SUFFIX}");
                let remote = self
                    .persist_with_refresh(external, &archive, &archive_name)
                    .await?;
                tracing::info!(
                    entry_id = %entry_id,
                    remote_id = %remote.id,
                    "archive persisted"
                );

                entry.update_storage(
                    StorageUpdate {
                        location: Some(external.store.location_url(&remote.id)),
                        tx: Some(remote.id.clone()),
                        url: remote.view_url.clone(),
                    },
                    &*self.keys,
                )?;

                let entry_name = format!("{entry_id}{ENTRY_SUFFIX}");
                let entry_bytes =
                    serde_json::to_vec(&entry).map_err(codex_core::CoreError::from)?;
                let entry_remote = self
                    .persist_with_refresh(external, &entry_bytes, &entry_name)
                    .await?;

                (Some(remote), Some(entry_remote))
            }
        };

        // 9. Validate the final entry. The verdict rides along in the
        // outcome either way.
        let validation = self
            .validator
            .validate(&entry)
            .await
            .map_err(|e| SealError::Unexpected(anyhow::Error::new(e)))?;
        tracing::info!(
            entry_id = %entry_id,
            signatures = entry.signatures.len(),
            valid = validation.valid,
            "sealing run finished"
        );

        Ok(SealOutcome {
            entry,
            archive,
            remote,
            entry_remote,
            validation,
        })
    }

    /// Derive the process tag and optional subject for the payload.
    ///
    /// Text-like payloads go through the classifier when one is
    /// configured; everything else gets the filename as subject and
    /// the fixed binary tag.
    async fn classify(
        &self,
        request: &SealRequest,
    ) -> Result<(String, Option<String>), SealError> {
        if is_text_artifact(&request.filename) {
            if let Some(classifier) = &self.classifier {
                let text: Cow<'_, str> = String::from_utf8_lossy(&request.payload);
                let subject = classifier
                    .summarize(&text)
                    .await
                    .map_err(|e| SealError::Hashing(e.to_string()))?;
                let process = classifier
                    .classify(&text)
                    .await
                    .map_err(|e| SealError::Hashing(e.to_string()))?;
                return Ok((process, Some(subject)));
            }
        }
        Ok((
            BINARY_PROCESS_TAG.to_string(),
            Some(request.filename.clone()),
        ))
    }

    fn external(&self) -> Result<&ExternalStack, SealError> {
        self.external.as_ref().ok_or_else(|| {
            SealError::Anchor(codex_anchor::AnchorError::Target(
                "no external anchor target configured".to_string(),
            ))
        })
    }

    /// Upload with at most one credential refresh.
    ///
    /// An `Unauthorized` rejection invalidates the cached credential
    /// and retries exactly once with a fresh one; a second failure of
    /// any kind is final.
    async fn persist_with_refresh(
        &self,
        external: &ExternalStack,
        bytes: &[u8],
        name: &str,
    ) -> Result<RemoteObject, SealError> {
        let credential = external.credentials.get().await?;
        match external.store.upload(bytes, name, &credential).await {
            Ok(remote) => Ok(remote),
            Err(ObjectStoreError::Unauthorized) => {
                tracing::warn!(name, "upload unauthorized, refreshing credential");
                external.credentials.invalidate().await;
                let fresh = external.credentials.get().await?;
                external
                    .store
                    .upload(bytes, name, &fresh)
                    .await
                    .map_err(SealError::PersistAfterRefresh)
            }
            Err(e) => Err(SealError::Persist(e)),
        }
    }
}
