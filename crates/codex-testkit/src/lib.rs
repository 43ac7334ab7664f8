//! # Codex Testkit
//!
//! Testing utilities for the Codex sealing stack.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Deterministic keys and pre-built entries for test
//!   scenarios
//! - **Mocks**: Scriptable collaborators (object store, credentials,
//!   classifier, validator, anchor target) for pipeline tests
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use codex_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let entry = fixture.make_sealed_entry(b"payload", "notes.txt");
//! assert!(entry.is_sealed());
//! ```
//!
//! ## Mock Collaborators
//!
//! Script an object store that rejects the first upload:
//!
//! ```rust
//! use codex_testkit::mocks::MockObjectStore;
//!
//! let store = MockObjectStore::failing_first(1);
//! ```

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use fixtures::{local_anchor, multi_signer_fixtures, TestFixture};
pub use generators::{entry_from_params, entry_params, EntryParams};
pub use mocks::{
    FailingClassifier, FixedValidator, MockAnchorTarget, MockObjectStore, SequenceCredentials,
    StaticClassifier, UploadRecord,
};
