//! Error types for anchor acquisition.

use thiserror::Error;

/// Errors from anchor providers.
///
/// A failed acquisition leaves no partial state; the caller either
/// gets a complete anchor or one of these.
#[derive(Debug, Error)]
pub enum AnchorError {
    /// The injected external target rejected or failed the request.
    #[error("anchor target failure: {0}")]
    Target(String),

    /// The external target rejected the caller's credential.
    #[error("anchor authorization rejected")]
    Unauthorized,
}
