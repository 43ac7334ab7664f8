//! Error taxonomy for the sealing pipeline.
//!
//! Every pipeline step has a distinct failure category carrying the
//! underlying cause. Failure at any step aborts the pipeline; no
//! partial entry is ever returned as success.

use thiserror::Error;

use codex_anchor::AnchorError;
use codex_archive::ArchiveError;
use codex_core::CoreError;

use crate::store::ObjectStoreError;

/// Errors from credential stores.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no credential available")]
    Unavailable,

    #[error("credential refresh failed: {0}")]
    Refresh(String),
}

/// Errors from content classifiers.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("classifier failure: {0}")]
    Failed(String),
}

/// Errors from entry validators.
///
/// A validator that runs and finds the entry invalid reports that in
/// its [`crate::validate::ValidationReport`]; this error means the
/// validator itself could not run.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("validator failure: {0}")]
    Failed(String),
}

/// Errors from chunk reassembly sessions.
#[derive(Debug, Error)]
pub enum ReassemblyError {
    #[error("chunk index {index} out of range for declared total {total}")]
    IndexOutOfRange { index: usize, total: usize },

    /// Declared chunks that never arrived. Reassembly refuses to
    /// produce a payload with silent gaps.
    #[error("missing chunks: {missing:?}")]
    MissingChunks { missing: Vec<usize> },
}

/// Per-step failure categories for [`crate::pipeline::SealPipeline`].
#[derive(Debug, Error)]
pub enum SealError {
    #[error("hashing/classification failed: {0}")]
    Hashing(String),

    #[error("anchor acquisition failed: {0}")]
    Anchor(#[from] AnchorError),

    #[error("entry construction failed: {0}")]
    Entry(#[from] CoreError),

    #[error("archive construction failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("credential failure: {0}")]
    Credentials(#[from] CredentialError),

    /// Initial persistence attempt failed with something other than
    /// an authorization rejection.
    #[error("external persistence failed: {0}")]
    Persist(ObjectStoreError),

    /// Persistence failed again after the one credential refresh.
    #[error("external persistence failed after credential refresh: {0}")]
    PersistAfterRefresh(ObjectStoreError),

    /// Catch-all; always reported, never silently swallowed.
    #[error("unexpected failure: {0}")]
    Unexpected(#[from] anyhow::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, SealError>;
