//! # Codex Anchor
//!
//! The anchor abstraction: a reference point establishing when and
//! where an entry was sealed. Two variants exist: [`LocalAnchor`]
//! produces deterministic offline references, [`ExternalAnchor`]
//! delegates to an injected capability. Selection is always a caller
//! decision, never inferred from payload content.

pub mod error;
pub mod provider;

pub use error::AnchorError;
pub use provider::{
    AnchorContext, AnchorProvider, AnchorTarget, ExternalAnchor, LocalAnchor, LOCAL_CHAIN,
};
