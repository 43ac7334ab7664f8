//! Content classification boundary.
//!
//! Text-like payloads get a derived subject and process tag from an
//! external classifier; everything else falls back to the filename
//! and a fixed binary tag.

use async_trait::async_trait;

use crate::error::ClassifyError;

/// Filename suffixes treated as text for classification purposes.
const TEXT_SUFFIXES: [&str; 3] = [".txt", ".md", ".json"];

/// External summarize/classify capability, used only for text-like
/// payloads.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// A short human-readable summary of the content.
    async fn summarize(&self, text: &str) -> Result<String, ClassifyError>;

    /// A short machine tag classifying how the artifact was produced.
    async fn classify(&self, text: &str) -> Result<String, ClassifyError>;
}

/// Whether a filename suggests a text payload worth classifying.
pub fn is_text_artifact(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    TEXT_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}
