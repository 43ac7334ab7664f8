//! Sealing orchestrator: the end-to-end pipeline from payload bytes
//! to a verified, packaged Codex entry.
//!
//! The pipeline wires together hashing and classification, anchor
//! acquisition, entry construction and sealing, archive packaging,
//! external persistence with a single credential refresh, and final
//! validation. Every external capability is an injected trait object.

pub mod classify;
pub mod error;
pub mod pipeline;
pub mod reassembly;
pub mod store;
pub mod validate;

pub use classify::{is_text_artifact, ContentClassifier};
pub use error::{
    ClassifyError, CredentialError, ReassemblyError, SealError, ValidatorError,
};
pub use pipeline::{
    AnchorSelection, SealConfig, SealOutcome, SealPipeline, SealRequest,
    DEFAULT_ARCHIVE_PASSWORD,
};
pub use reassembly::{ChunkSession, InsertOutcome};
pub use store::{
    Credential, CredentialStore, MemoryCredentialStore, ObjectMetadata, ObjectStore,
    ObjectStoreError, RemoteObject,
};
pub use validate::{EntryValidator, StructuralValidator, ValidationReport};
