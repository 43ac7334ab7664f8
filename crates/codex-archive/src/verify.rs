//! One-call verification of a packed archive.

use codex_core::{verify_entry, CodexEntry, EntryReport};

use crate::pack::unpack;

/// Verdict for a complete archive: extraction plus payload integrity
/// plus signature log.
#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub valid: bool,
    pub errors: Vec<String>,
    /// Present when extraction succeeded.
    pub payload_filename: Option<String>,
    /// The full entry the archive carried.
    pub entry: Option<CodexEntry>,
    /// Per-check details when extraction succeeded.
    pub details: Option<EntryReport>,
}

/// Unpack an archive and verify its payload against its entry.
///
/// Never fails: extraction and verification problems are collected
/// into the report.
pub fn verify_archive(bytes: &[u8], password: Option<&str>) -> ArchiveReport {
    let unpacked = match unpack(bytes, password) {
        Ok(unpacked) => unpacked,
        Err(e) => {
            return ArchiveReport {
                valid: false,
                errors: vec![e.to_string()],
                payload_filename: None,
                entry: None,
                details: None,
            }
        }
    };

    match verify_entry(&unpacked.payload, &unpacked.entry) {
        Ok(report) => ArchiveReport {
            valid: report.valid,
            errors: report.errors.clone(),
            payload_filename: Some(unpacked.payload_filename),
            entry: Some(unpacked.entry),
            details: Some(report),
        },
        Err(e) => ArchiveReport {
            valid: false,
            errors: vec![e.to_string()],
            payload_filename: Some(unpacked.payload_filename),
            entry: Some(unpacked.entry),
            details: None,
        },
    }
}
