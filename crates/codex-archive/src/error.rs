//! Error types for archive packaging.

use thiserror::Error;

/// Errors from packing and unpacking Codex archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("entry serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The fixed-name metadata file is absent.
    #[error("codex-entry.json not found in archive")]
    EntryFileMissing,

    /// The archive holds no payload file.
    #[error("no payload file found in archive")]
    PayloadMissing,

    /// The contract is exactly one payload per archive.
    #[error("expected exactly one payload file, found {0}")]
    MultiplePayloads(usize),
}
