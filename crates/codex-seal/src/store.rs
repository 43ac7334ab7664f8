//! External persistence boundaries: object storage and credentials.
//!
//! The core never talks to a concrete backend; it sees these traits.
//! Implementations decide the transport and must fail distinguishably
//! on an expired or invalid credential so the pipeline's single
//! refresh-and-retry can recognize it.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::CredentialError;

/// An opaque bearer credential for the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(pub String);

/// Errors from object-store operations.
#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreError {
    /// The credential was rejected. The only class eligible for
    /// automatic recovery.
    #[error("authorization rejected")]
    Unauthorized,

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// A persisted object's identity and optional browser-facing URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub id: String,
    pub view_url: Option<String>,
}

/// Metadata returned by an existence probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub id: String,
    pub name: String,
    pub size: Option<u64>,
}

/// The external upload/reference capability.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a named blob, returning its remote identity.
    async fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        credential: &Credential,
    ) -> Result<RemoteObject, ObjectStoreError>;

    /// Probe whether a previously uploaded object still exists.
    async fn exists(
        &self,
        id: &str,
        credential: &Credential,
    ) -> Result<ObjectMetadata, ObjectStoreError>;

    /// The canonical location URI for a persisted object.
    fn location_url(&self, id: &str) -> String;
}

/// Credential storage with explicit invalidation.
///
/// The store itself must serialize refresh so two concurrent sealing
/// runs cannot each invalidate and re-fetch the same credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current credential, refreshing if none is cached.
    async fn get(&self) -> Result<Credential, CredentialError>;

    /// Replace the cached credential.
    async fn set(&self, credential: Credential);

    /// Drop the cached credential; the next `get` refreshes.
    async fn invalidate(&self);
}

type RefreshFn =
    Box<dyn Fn() -> Result<Credential, CredentialError> + Send + Sync>;

/// In-memory credential store backed by an injected refresh source.
///
/// A single async mutex guards the cached value, so concurrent
/// refreshes collapse into one.
pub struct MemoryCredentialStore {
    cached: Mutex<Option<Credential>>,
    refresh: RefreshFn,
}

impl MemoryCredentialStore {
    /// Create a store that refreshes through the given source.
    pub fn new<F>(refresh: F) -> Self
    where
        F: Fn() -> Result<Credential, CredentialError> + Send + Sync + 'static,
    {
        Self {
            cached: Mutex::new(None),
            refresh: Box::new(refresh),
        }
    }

    /// Create a store seeded with a fixed credential and no refresh
    /// source. After invalidation, `get` fails.
    pub fn fixed(credential: Credential) -> Self {
        Self {
            cached: Mutex::new(Some(credential)),
            refresh: Box::new(|| Err(CredentialError::Unavailable)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Credential, CredentialError> {
        let mut cached = self.cached.lock().await;
        if let Some(credential) = cached.as_ref() {
            return Ok(credential.clone());
        }
        let fresh = (self.refresh)()?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    async fn set(&self, credential: Credential) {
        *self.cached.lock().await = Some(credential);
    }

    async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
