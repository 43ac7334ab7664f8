//! Anchor providers: local references and injected external targets.
//!
//! Exactly two variants exist. Adding a third anchor type means
//! adding a provider implementation; the orchestrator's control flow
//! does not change.

use async_trait::async_trait;
use uuid::Uuid;

use codex_core::{Anchor, IntegrityProof, StorageProtocol, PROOF_ALGORITHM};

use crate::error::AnchorError;

/// Chain identifier for offline local anchors.
pub const LOCAL_CHAIN: &str = "mock:local";

/// What the provider gets to work with: the id of the entry under
/// construction and the already-fixed integrity proof.
#[derive(Debug, Clone)]
pub struct AnchorContext {
    pub entry_id: String,
    pub integrity_proof: IntegrityProof,
}

/// A source of anchors for entries under construction.
///
/// An anchor, once produced, is immutable input to entry
/// construction; only the entry's embedded `tx`/`url` fields are
/// refreshed later, when persistence completes.
#[async_trait]
pub trait AnchorProvider: Send + Sync {
    /// Produce a reference record for the given context.
    async fn acquire(&self, ctx: &AnchorContext) -> Result<Anchor, AnchorError>;

    /// The storage protocol entries anchored here should declare.
    fn protocol(&self) -> StorageProtocol;
}

/// Injected capability behind an external anchor: asked to produce a
/// reference record against whatever system it fronts.
#[async_trait]
pub trait AnchorTarget: Send + Sync {
    async fn reference(&self, ctx: &AnchorContext) -> Result<Anchor, AnchorError>;
}

/// Deterministic, offline anchor source.
///
/// Fixed chain identifier, a freshly generated transaction
/// identifier, declared hash algorithm, no URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAnchor;

#[async_trait]
impl AnchorProvider for LocalAnchor {
    async fn acquire(&self, _ctx: &AnchorContext) -> Result<Anchor, AnchorError> {
        Ok(Anchor {
            chain: LOCAL_CHAIN.to_string(),
            tx: Uuid::new_v4().to_string(),
            hash_alg: PROOF_ALGORITHM.to_string(),
            url: None,
            timestamp: Some(now_millis()),
        })
    }

    fn protocol(&self) -> StorageProtocol {
        StorageProtocol::Local
    }
}

/// Anchor source delegating to an injected external target.
///
/// Failures propagate as [`AnchorError`] with no partial state.
pub struct ExternalAnchor<T: AnchorTarget> {
    target: T,
}

impl<T: AnchorTarget> ExternalAnchor<T> {
    pub fn new(target: T) -> Self {
        Self { target }
    }
}

#[async_trait]
impl<T: AnchorTarget> AnchorProvider for ExternalAnchor<T> {
    async fn acquire(&self, ctx: &AnchorContext) -> Result<Anchor, AnchorError> {
        self.target.reference(ctx).await
    }

    fn protocol(&self) -> StorageProtocol {
        StorageProtocol::GDrive
    }
}

/// Current time in Unix milliseconds. A clock before the epoch reads
/// as 0 rather than panicking.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
