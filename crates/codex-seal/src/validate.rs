//! Entry validation boundary.
//!
//! The published schema lives with an external validator; the core
//! only guarantees entries are structurally consistent enough to be
//! validated there. [`StructuralValidator`] wraps the local check as
//! the default collaborator.

use async_trait::async_trait;

use codex_core::{validate_entry_structure, CodexEntry};

use crate::error::ValidatorError;

/// Verdict from the structural validator.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// A passing report.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A failing report with the given messages.
    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// External structural-validation capability.
#[async_trait]
pub trait EntryValidator: Send + Sync {
    async fn validate(&self, entry: &CodexEntry) -> Result<ValidationReport, ValidatorError>;
}

/// Default validator: the local structural consistency check.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

#[async_trait]
impl EntryValidator for StructuralValidator {
    async fn validate(&self, entry: &CodexEntry) -> Result<ValidationReport, ValidatorError> {
        match validate_entry_structure(entry) {
            Ok(()) => Ok(ValidationReport::ok()),
            Err(e) => Ok(ValidationReport::failed(vec![e.to_string()])),
        }
    }
}
