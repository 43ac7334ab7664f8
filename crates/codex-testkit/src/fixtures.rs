//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use codex_core::{
    Anchor, CodexEntry, EntryBuilder, EsKeypair, IntegrityProof, StorageProtocol,
};

/// A test fixture with a deterministic signing keypair.
pub struct TestFixture {
    pub keys: EsKeypair,
}

impl TestFixture {
    /// Create a fixture with a fixed seed so key material, and
    /// therefore kids, are stable across runs.
    pub fn new() -> Self {
        Self::with_seed([0x42; 32])
    }

    /// Create a fixture with the given key seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keys: EsKeypair::from_seed(&seed).expect("seed is a valid P-256 scalar"),
        }
    }

    /// An unsigned entry over the given payload, locally anchored.
    pub fn make_entry(&self, payload: &[u8], filename: &str) -> CodexEntry {
        EntryBuilder::new()
            .integrity_proof(IntegrityProof::compute(payload))
            .process("test-process")
            .artifact(filename)
            .anchor(local_anchor())
            .protocol(StorageProtocol::Local)
            .build()
            .expect("all required fields set")
    }

    /// A sealed entry over the given payload.
    pub fn make_sealed_entry(&self, payload: &[u8], filename: &str) -> CodexEntry {
        let mut entry = self.make_entry(payload, filename);
        codex_core::seal_entry(&mut entry, &self.keys).expect("signing never fails in tests");
        entry
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixed-shape local anchor for entry construction in tests.
pub fn local_anchor() -> Anchor {
    Anchor {
        chain: "mock:local".to_string(),
        tx: "tx-fixture".to_string(),
        hash_alg: "sha-256".to_string(),
        url: None,
        timestamp: Some(1_700_000_000_000),
    }
}

/// Multiple fixtures with distinct deterministic keys for
/// multi-signer tests.
pub fn multi_signer_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0x42u8; 32];
            seed[0] = i as u8 + 1;
            TestFixture::with_seed(seed)
        })
        .collect()
}
