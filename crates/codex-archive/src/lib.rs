//! # Codex Archive
//!
//! Dual-representation packaging for sealed Codex entries.
//!
//! An archive is a standard ZIP holding exactly one payload file plus
//! two representations of its entry: the reduced "pre-location" form
//! as a fixed-name file inside the container, and the full current
//! form as the container comment, readable without unpacking. This
//! solves the circular dependency between "the hash must be known
//! before upload" and "the entry must record where it was uploaded".

pub mod error;
pub mod pack;
pub mod verify;

pub use error::ArchiveError;
pub use pack::{pack, unpack, UnpackedArchive, ENTRY_FILE_NAME};
pub use verify::{verify_archive, ArchiveReport};
