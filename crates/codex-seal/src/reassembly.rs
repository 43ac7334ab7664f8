//! Chunked payload reassembly.
//!
//! Large payloads arrive as indexed chunks, possibly out of order and
//! possibly duplicated. A [`ChunkSession`] tracks what has arrived
//! against the declared total and only yields a payload once every
//! declared chunk is present.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::ReassemblyError;

/// What an insert did with the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// First arrival at this index.
    Accepted,
    /// A chunk at this index was already buffered; the new bytes
    /// replaced it.
    Replaced,
}

/// Accumulates indexed chunks for one payload.
#[derive(Debug)]
pub struct ChunkSession {
    declared_total: usize,
    chunks: BTreeMap<usize, Bytes>,
}

impl ChunkSession {
    /// Start a session expecting `declared_total` chunks, indexed
    /// `0..declared_total`.
    pub fn new(declared_total: usize) -> Self {
        Self {
            declared_total,
            chunks: BTreeMap::new(),
        }
    }

    /// Buffer one chunk. Indices at or past the declared total are
    /// rejected; a duplicate index overwrites the earlier bytes.
    pub fn insert(
        &mut self,
        index: usize,
        bytes: impl Into<Bytes>,
    ) -> Result<InsertOutcome, ReassemblyError> {
        if index >= self.declared_total {
            return Err(ReassemblyError::IndexOutOfRange {
                index,
                total: self.declared_total,
            });
        }
        match self.chunks.insert(index, bytes.into()) {
            None => Ok(InsertOutcome::Accepted),
            Some(_) => Ok(InsertOutcome::Replaced),
        }
    }

    /// Number of distinct chunk indices buffered so far.
    pub fn received(&self) -> usize {
        self.chunks.len()
    }

    /// The declared chunk count.
    pub fn declared_total(&self) -> usize {
        self.declared_total
    }

    /// Declared indices that have not arrived, in ascending order.
    pub fn missing(&self) -> Vec<usize> {
        (0..self.declared_total)
            .filter(|index| !self.chunks.contains_key(index))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.chunks.len() == self.declared_total
    }

    /// Concatenate the chunks in index order.
    ///
    /// Fails listing every missing index if any declared chunk never
    /// arrived.
    pub fn finish(self) -> Result<Vec<u8>, ReassemblyError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ReassemblyError::MissingChunks { missing });
        }
        let mut payload = Vec::with_capacity(
            self.chunks.values().map(|chunk| chunk.len()).sum(),
        );
        for chunk in self.chunks.values() {
            payload.extend_from_slice(chunk);
        }
        Ok(payload)
    }
}
