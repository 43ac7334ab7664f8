//! Mock collaborators for pipeline tests.
//!
//! Each mock records what it was asked to do and can be scripted to
//! fail, so tests can pin down retry and error-mapping behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use codex_anchor::{AnchorContext, AnchorError, AnchorTarget};
use codex_core::{Anchor, CodexEntry, PROOF_ALGORITHM};
use codex_seal::{
    ClassifyError, ContentClassifier, Credential, CredentialError, CredentialStore,
    EntryValidator, ObjectMetadata, ObjectStore, ObjectStoreError, RemoteObject,
    ValidationReport, ValidatorError,
};

/// One recorded upload.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub name: String,
    pub size: usize,
    pub credential: Credential,
}

/// An in-memory object store.
///
/// The first `auth_failures` upload attempts are rejected as
/// unauthorized; every attempt, rejected or not, is recorded.
pub struct MockObjectStore {
    auth_failures: AtomicUsize,
    uploads: Mutex<Vec<UploadRecord>>,
    stored: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    /// Reject the first `auth_failures` uploads with `Unauthorized`.
    pub fn failing_first(auth_failures: usize) -> Self {
        Self {
            auth_failures: AtomicUsize::new(auth_failures),
            uploads: Mutex::new(Vec::new()),
            stored: Mutex::new(Vec::new()),
        }
    }

    /// Every upload attempt so far, in order.
    pub async fn upload_log(&self) -> Vec<UploadRecord> {
        self.uploads.lock().await.clone()
    }

    /// Bytes successfully stored under the given name.
    pub async fn stored_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.stored
            .lock()
            .await
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.clone())
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        credential: &Credential,
    ) -> Result<RemoteObject, ObjectStoreError> {
        self.uploads.lock().await.push(UploadRecord {
            name: name.to_string(),
            size: bytes.len(),
            credential: credential.clone(),
        });

        let remaining = self.auth_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.auth_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ObjectStoreError::Unauthorized);
        }

        let mut stored = self.stored.lock().await;
        stored.push((name.to_string(), bytes.to_vec()));
        let id = format!("remote-{}", stored.len());
        Ok(RemoteObject {
            view_url: Some(format!("https://mock.store/view/{id}")),
            id,
        })
    }

    async fn exists(
        &self,
        id: &str,
        _credential: &Credential,
    ) -> Result<ObjectMetadata, ObjectStoreError> {
        let index: usize = id
            .strip_prefix("remote-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| ObjectStoreError::NotFound(id.to_string()))?;
        let stored = self.stored.lock().await;
        let (name, bytes) = stored
            .get(index.wrapping_sub(1))
            .ok_or_else(|| ObjectStoreError::NotFound(id.to_string()))?;
        Ok(ObjectMetadata {
            id: id.to_string(),
            name: name.clone(),
            size: Some(bytes.len() as u64),
        })
    }

    fn location_url(&self, id: &str) -> String {
        format!("https://mock.store/objects/{id}")
    }
}

/// A credential store issuing "token-1", "token-2", ... on each
/// refresh, so tests can see which credential an upload used.
pub struct SequenceCredentials {
    issued: Arc<AtomicUsize>,
    inner: codex_seal::MemoryCredentialStore,
}

impl SequenceCredentials {
    pub fn new() -> Self {
        let issued = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&issued);
        let inner = codex_seal::MemoryCredentialStore::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Credential(format!("token-{n}")))
        });
        Self { issued, inner }
    }

    /// How many credentials have been issued.
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

impl Default for SequenceCredentials {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for SequenceCredentials {
    async fn get(&self) -> Result<Credential, CredentialError> {
        self.inner.get().await
    }

    async fn set(&self, credential: Credential) {
        self.inner.set(credential).await
    }

    async fn invalidate(&self) {
        self.inner.invalidate().await
    }
}

/// A classifier returning fixed strings.
pub struct StaticClassifier {
    pub subject: String,
    pub process: String,
}

impl StaticClassifier {
    pub fn new(subject: &str, process: &str) -> Self {
        Self {
            subject: subject.to_string(),
            process: process.to_string(),
        }
    }
}

#[async_trait]
impl ContentClassifier for StaticClassifier {
    async fn summarize(&self, _text: &str) -> Result<String, ClassifyError> {
        Ok(self.subject.clone())
    }

    async fn classify(&self, _text: &str) -> Result<String, ClassifyError> {
        Ok(self.process.clone())
    }
}

/// A classifier that always fails.
pub struct FailingClassifier;

#[async_trait]
impl ContentClassifier for FailingClassifier {
    async fn summarize(&self, _text: &str) -> Result<String, ClassifyError> {
        Err(ClassifyError::Failed("summarizer offline".to_string()))
    }

    async fn classify(&self, _text: &str) -> Result<String, ClassifyError> {
        Err(ClassifyError::Failed("classifier offline".to_string()))
    }
}

/// A validator with a fixed verdict.
pub struct FixedValidator {
    pub report: ValidationReport,
}

impl FixedValidator {
    pub fn passing() -> Self {
        Self {
            report: ValidationReport::ok(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            report: ValidationReport::failed(vec![message.to_string()]),
        }
    }
}

#[async_trait]
impl EntryValidator for FixedValidator {
    async fn validate(&self, _entry: &CodexEntry) -> Result<ValidationReport, ValidatorError> {
        Ok(self.report.clone())
    }
}

/// An anchor target producing a deterministic external-looking
/// anchor from the context.
pub struct MockAnchorTarget;

#[async_trait]
impl AnchorTarget for MockAnchorTarget {
    async fn reference(&self, ctx: &AnchorContext) -> Result<Anchor, AnchorError> {
        Ok(Anchor {
            chain: "google:drive".to_string(),
            tx: format!("pending-{}", ctx.entry_id),
            hash_alg: PROOF_ALGORITHM.to_string(),
            url: None,
            timestamp: Some(1_700_000_000_000),
        })
    }
}
