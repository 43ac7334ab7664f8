//! Packing and unpacking of Codex archives.
//!
//! An archive holds exactly one payload file and two representations
//! of its entry: a "pre-location" reduced entry under a fixed file
//! name (the entry's state at the moment the payload hash was fixed,
//! for deterministic construction) and the full current entry as the
//! archive-level comment, readable without unpacking. Constructed
//! once, never mutated.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipArchive, ZipWriter};

use codex_core::CodexEntry;

use crate::error::ArchiveError;

/// Fixed name of the metadata file inside every archive.
pub const ENTRY_FILE_NAME: &str = "codex-entry.json";

/// Result of unpacking an archive.
#[derive(Debug, Clone)]
pub struct UnpackedArchive {
    /// The payload bytes, decrypted when a password was supplied.
    pub payload: Vec<u8>,

    /// The payload's original filename.
    pub payload_filename: String,

    /// The full entry: taken from the archive comment when present
    /// and parsable, otherwise the in-file reduced entry.
    pub entry: CodexEntry,

    /// The reduced entry from the metadata file.
    pub file_entry: CodexEntry,
}

/// Pack a payload and its entry into a single archive blob.
///
/// The metadata file carries the entry with `storage.location`
/// omitted and is never encrypted. With a password, the payload is
/// AES-256 encrypted before being stored.
pub fn pack(
    payload: &[u8],
    filename: &str,
    entry: &CodexEntry,
    password: Option<&str>,
) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.set_comment(serde_json::to_string(entry)?);

    let metadata_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(ENTRY_FILE_NAME, metadata_options)?;
    writer.write_all(&serde_json::to_vec(&entry.without_location())?)?;

    let mut payload_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    if let Some(password) = password {
        payload_options = payload_options.with_aes_encryption(AesMode::Aes256, password);
    }
    writer.start_file(filename, payload_options)?;
    writer.write_all(payload)?;

    let cursor = writer.finish()?;
    tracing::debug!(
        entry_id = %entry.id,
        payload_len = payload.len(),
        encrypted = password.is_some(),
        "packed codex archive"
    );
    Ok(cursor.into_inner())
}

/// Unpack an archive, recovering the payload and both entry
/// representations.
pub fn unpack(bytes: &[u8], password: Option<&str>) -> Result<UnpackedArchive, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    // The comment is best-effort: absent or unparsable comments fall
    // back to the in-file entry.
    let comment_entry: Option<CodexEntry> = serde_json::from_slice(archive.comment()).ok();

    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    if !names.iter().any(|n| n == ENTRY_FILE_NAME) {
        return Err(ArchiveError::EntryFileMissing);
    }

    let payload_names: Vec<&String> = names
        .iter()
        .filter(|n| n.as_str() != ENTRY_FILE_NAME && !n.ends_with('/'))
        .collect();
    let payload_filename = match payload_names.as_slice() {
        [] => return Err(ArchiveError::PayloadMissing),
        [single] => (*single).clone(),
        many => return Err(ArchiveError::MultiplePayloads(many.len())),
    };

    let mut entry_json = String::new();
    archive
        .by_name(ENTRY_FILE_NAME)?
        .read_to_string(&mut entry_json)?;
    let file_entry: CodexEntry = serde_json::from_str(&entry_json)?;

    let mut payload = Vec::new();
    match password {
        Some(password) => archive
            .by_name_decrypt(&payload_filename, password.as_bytes())?
            .read_to_end(&mut payload)?,
        None => archive.by_name(&payload_filename)?.read_to_end(&mut payload)?,
    };

    let entry = comment_entry.unwrap_or_else(|| file_entry.clone());
    Ok(UnpackedArchive {
        payload,
        payload_filename,
        entry,
        file_entry,
    })
}
