//! Proptest strategies for entry construction.

use proptest::prelude::*;

use codex_core::{Anchor, CodexEntry, EntryBuilder, IntegrityProof, StorageProtocol};

/// Inputs for building an arbitrary unsigned entry.
#[derive(Debug, Clone)]
pub struct EntryParams {
    pub payload: Vec<u8>,
    pub filename: String,
    pub process: String,
    pub subject: Option<String>,
    pub org: String,
}

/// Strategy producing arbitrary entry parameters.
pub fn entry_params() -> impl Strategy<Value = EntryParams> {
    (
        prop::collection::vec(any::<u8>(), 0..256),
        "[a-z][a-z0-9_-]{0,15}\\.(txt|md|json|png|zip)",
        "[a-z-]{1,24}",
        prop::option::of("[ -~]{1,40}"),
        "[A-Za-z ]{1,24}",
    )
        .prop_map(|(payload, filename, process, subject, org)| EntryParams {
            payload,
            filename,
            process,
            subject,
            org,
        })
}

/// Build an unsigned entry from generated parameters.
pub fn entry_from_params(params: &EntryParams) -> CodexEntry {
    let mut builder = EntryBuilder::new()
        .integrity_proof(IntegrityProof::compute(&params.payload))
        .org(params.org.clone())
        .process(params.process.clone())
        .artifact(params.filename.clone())
        .anchor(Anchor {
            chain: "mock:local".to_string(),
            tx: "tx-generated".to_string(),
            hash_alg: "sha-256".to_string(),
            url: None,
            timestamp: None,
        })
        .protocol(StorageProtocol::Local);
    if let Some(subject) = &params.subject {
        builder = builder.subject(subject.clone());
    }
    builder.build().expect("all required fields set")
}

#[cfg(test)]
mod tests {
    use super::*;
    use codex_core::{canonical_entry_bytes, verify_signatures, EsKeypair};

    proptest! {
        #[test]
        fn prop_canonical_bytes_are_deterministic(params in entry_params()) {
            let entry = entry_from_params(&params);
            let a = canonical_entry_bytes(&entry).unwrap();
            let b = canonical_entry_bytes(&entry).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_sealed_generated_entries_verify(params in entry_params()) {
            let keys = EsKeypair::from_seed(&[7u8; 32]).unwrap();
            let mut entry = entry_from_params(&params);
            codex_core::seal_entry(&mut entry, &keys).unwrap();

            let report = verify_signatures(&entry).unwrap();
            prop_assert!(report.valid);
            prop_assert_eq!(report.verified, 1);
        }
    }
}
