//! End-to-end pipeline tests with mock collaborators.

use std::sync::Arc;

use bytes::Bytes;

use codex_anchor::ExternalAnchor;
use codex_archive::{unpack, verify_archive};
use codex_core::{verify_signatures, StorageProtocol, BINARY_PROCESS_TAG};
use codex_seal::{
    AnchorSelection, ObjectStore, SealConfig, SealError, SealPipeline, SealRequest,
    DEFAULT_ARCHIVE_PASSWORD,
};
use codex_testkit::{
    FailingClassifier, FixedValidator, MockAnchorTarget, MockObjectStore, SequenceCredentials,
    StaticClassifier, TestFixture,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn local_pipeline() -> SealPipeline {
    let fixture = TestFixture::new();
    SealPipeline::new(Arc::new(fixture.keys), SealConfig::default())
}

fn external_pipeline(
    store: Arc<MockObjectStore>,
    credentials: Arc<SequenceCredentials>,
) -> SealPipeline {
    let fixture = TestFixture::new();
    SealPipeline::new(Arc::new(fixture.keys), SealConfig::default()).with_external(
        Arc::new(ExternalAnchor::new(MockAnchorTarget)),
        store,
        credentials,
    )
}

fn request(anchor: AnchorSelection) -> SealRequest {
    SealRequest {
        payload: Bytes::from_static(b"the payload bytes"),
        filename: "report.bin".to_string(),
        anchor,
        created_by: None,
        sealer_identity: None,
    }
}

#[tokio::test]
async fn local_seal_produces_verified_entry_and_archive() {
    init_tracing();
    let pipeline = local_pipeline();

    let outcome = pipeline.seal(request(AnchorSelection::Local)).await.unwrap();

    assert_eq!(outcome.entry.signatures.len(), 1);
    assert_eq!(outcome.entry.storage.protocol, StorageProtocol::Local);
    assert!(outcome.entry.storage.location.is_none());
    assert_eq!(outcome.entry.identity.process, BINARY_PROCESS_TAG);
    assert_eq!(outcome.entry.identity.subject.as_deref(), Some("report.bin"));
    assert!(outcome.remote.is_none());
    assert!(outcome.entry_remote.is_none());
    assert!(outcome.validation.valid);

    let report = verify_signatures(&outcome.entry).unwrap();
    assert!(report.valid);
    assert_eq!(report.verified, 1);

    let archive_report = verify_archive(&outcome.archive, Some(DEFAULT_ARCHIVE_PASSWORD));
    assert!(archive_report.valid, "errors: {:?}", archive_report.errors);

    let unpacked = unpack(&outcome.archive, Some(DEFAULT_ARCHIVE_PASSWORD)).unwrap();
    assert_eq!(unpacked.payload, b"the payload bytes");
    assert_eq!(unpacked.payload_filename, "report.bin");
    assert_eq!(unpacked.entry.id, outcome.entry.id);
}

#[tokio::test]
async fn external_seal_persists_and_reseals() {
    init_tracing();
    let store = Arc::new(MockObjectStore::new());
    let credentials = Arc::new(SequenceCredentials::new());
    let pipeline = external_pipeline(Arc::clone(&store), Arc::clone(&credentials));

    let outcome = pipeline
        .seal(request(AnchorSelection::External))
        .await
        .unwrap();

    // Sealed once before packaging, again after storage update.
    assert_eq!(outcome.entry.signatures.len(), 2);
    assert_eq!(outcome.entry.storage.protocol, StorageProtocol::GDrive);

    let remote = outcome.remote.as_ref().unwrap();
    assert_eq!(
        outcome.entry.storage.location.as_deref(),
        Some(store.location_url(&remote.id).as_str())
    );
    assert_eq!(outcome.entry.anchor.tx, remote.id);
    assert_eq!(outcome.entry.anchor.url, remote.view_url);

    // Later signatures cover the mutated state; earlier ones go stale
    // but the log still verifies.
    let report = verify_signatures(&outcome.entry).unwrap();
    assert!(report.valid);
    assert_eq!(report.verified, 1);
    assert_eq!(report.total, 2);

    // Archive and standalone entry both persisted.
    let log = store.upload_log().await;
    assert_eq!(log.len(), 2);
    assert!(log[0].name.ends_with(".zip"));
    assert!(log[1].name.ends_with(".codex.json"));
    assert_eq!(log[0].name, format!("{}.zip", outcome.entry.id));

    // The persisted standalone entry is the final, twice-sealed one.
    let entry_bytes = store.stored_bytes(&log[1].name).await.unwrap();
    let persisted: codex_core::CodexEntry = serde_json::from_slice(&entry_bytes).unwrap();
    assert_eq!(persisted, outcome.entry);

    // One credential served both uploads.
    assert_eq!(credentials.issued(), 1);
}

#[tokio::test]
async fn external_seal_archive_snapshot_predates_storage_update() {
    init_tracing();
    let store = Arc::new(MockObjectStore::new());
    let credentials = Arc::new(SequenceCredentials::new());
    let pipeline = external_pipeline(Arc::clone(&store), credentials);

    let outcome = pipeline
        .seal(request(AnchorSelection::External))
        .await
        .unwrap();

    // The archive was packed before persistence, so its embedded
    // entry has one signature and no location.
    let unpacked = unpack(&outcome.archive, Some(DEFAULT_ARCHIVE_PASSWORD)).unwrap();
    assert_eq!(unpacked.entry.signatures.len(), 1);
    assert!(unpacked.file_entry.storage.location.is_none());
    assert_eq!(unpacked.entry.id, outcome.entry.id);

    // And the persisted archive blob is the same bytes.
    let stored = store
        .stored_bytes(&format!("{}.zip", outcome.entry.id))
        .await
        .unwrap();
    assert_eq!(stored, outcome.archive);
}

#[tokio::test]
async fn unauthorized_upload_refreshes_credential_and_retries_once() {
    init_tracing();
    let store = Arc::new(MockObjectStore::failing_first(1));
    let credentials = Arc::new(SequenceCredentials::new());
    let pipeline = external_pipeline(Arc::clone(&store), Arc::clone(&credentials));

    let outcome = pipeline
        .seal(request(AnchorSelection::External))
        .await
        .unwrap();
    assert!(outcome.remote.is_some());

    // Rejected archive upload, retried archive upload, entry upload.
    let log = store.upload_log().await;
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].credential.0, "token-1");
    assert_eq!(log[1].credential.0, "token-2");
    assert_eq!(log[2].credential.0, "token-2");
    assert_eq!(credentials.issued(), 2);
}

#[tokio::test]
async fn second_unauthorized_failure_is_final() {
    init_tracing();
    let store = Arc::new(MockObjectStore::failing_first(2));
    let credentials = Arc::new(SequenceCredentials::new());
    let pipeline = external_pipeline(Arc::clone(&store), Arc::clone(&credentials));

    let err = pipeline
        .seal(request(AnchorSelection::External))
        .await
        .unwrap_err();
    assert!(matches!(err, SealError::PersistAfterRefresh(_)));

    // Exactly one retry happened.
    assert_eq!(store.upload_log().await.len(), 2);
    assert_eq!(credentials.issued(), 2);
}

#[tokio::test]
async fn external_seal_without_configured_stack_fails() {
    init_tracing();
    let pipeline = local_pipeline();
    let err = pipeline
        .seal(request(AnchorSelection::External))
        .await
        .unwrap_err();
    assert!(matches!(err, SealError::Anchor(_)));
}

#[tokio::test]
async fn text_payload_goes_through_classifier() {
    init_tracing();
    let fixture = TestFixture::new();
    let pipeline = SealPipeline::new(Arc::new(fixture.keys), SealConfig::default())
        .with_classifier(Arc::new(StaticClassifier::new(
            "meeting notes",
            "text-summary",
        )));

    let outcome = pipeline
        .seal(SealRequest {
            payload: Bytes::from_static(b"notes from the meeting"),
            filename: "notes.txt".to_string(),
            anchor: AnchorSelection::Local,
            created_by: None,
            sealer_identity: None,
        })
        .await
        .unwrap();

    assert_eq!(outcome.entry.identity.process, "text-summary");
    assert_eq!(
        outcome.entry.identity.subject.as_deref(),
        Some("meeting notes")
    );
}

#[tokio::test]
async fn binary_payload_skips_classifier() {
    init_tracing();
    let fixture = TestFixture::new();
    // A failing classifier proves it is never consulted.
    let pipeline = SealPipeline::new(Arc::new(fixture.keys), SealConfig::default())
        .with_classifier(Arc::new(FailingClassifier));

    let outcome = pipeline.seal(request(AnchorSelection::Local)).await.unwrap();
    assert_eq!(outcome.entry.identity.process, BINARY_PROCESS_TAG);
}

#[tokio::test]
async fn classifier_failure_aborts_the_run() {
    init_tracing();
    let fixture = TestFixture::new();
    let pipeline = SealPipeline::new(Arc::new(fixture.keys), SealConfig::default())
        .with_classifier(Arc::new(FailingClassifier));

    let err = pipeline
        .seal(SealRequest {
            payload: Bytes::from_static(b"text"),
            filename: "doc.md".to_string(),
            anchor: AnchorSelection::Local,
            created_by: None,
            sealer_identity: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SealError::Hashing(_)));
}

#[tokio::test]
async fn invalid_verdict_is_data_not_error() {
    init_tracing();
    let fixture = TestFixture::new();
    let pipeline = SealPipeline::new(Arc::new(fixture.keys), SealConfig::default())
        .with_validator(Arc::new(FixedValidator::failing("schema drift")));

    let outcome = pipeline.seal(request(AnchorSelection::Local)).await.unwrap();
    assert!(!outcome.validation.valid);
    assert_eq!(outcome.validation.errors, vec!["schema drift".to_string()]);
    // The entry itself is still sealed and returned.
    assert!(outcome.entry.is_sealed());
}

#[tokio::test]
async fn sealer_identity_becomes_archive_password_for_anchored_runs() {
    init_tracing();
    let store = Arc::new(MockObjectStore::new());
    let credentials = Arc::new(SequenceCredentials::new());
    let pipeline = external_pipeline(store, credentials);

    let outcome = pipeline
        .seal(SealRequest {
            payload: Bytes::from_static(b"secret payload"),
            filename: "secret.bin".to_string(),
            anchor: AnchorSelection::External,
            created_by: None,
            sealer_identity: Some("sealer@example.org".to_string()),
        })
        .await
        .unwrap();

    let unpacked = unpack(&outcome.archive, Some("sealer@example.org")).unwrap();
    assert_eq!(unpacked.payload, b"secret payload");

    // The default password no longer opens the payload.
    assert!(unpack(&outcome.archive, Some(DEFAULT_ARCHIVE_PASSWORD)).is_err());
}

#[tokio::test]
async fn created_by_attribution_is_carried_through() {
    init_tracing();
    let pipeline = local_pipeline();

    let attribution = serde_json::json!({"agent": "forge-ui", "version": "0.0.2"});
    let outcome = pipeline
        .seal(SealRequest {
            payload: Bytes::from_static(b"x"),
            filename: "x.bin".to_string(),
            anchor: AnchorSelection::Local,
            created_by: Some(attribution.clone()),
            sealer_identity: None,
        })
        .await
        .unwrap();

    assert_eq!(outcome.entry.created_by, Some(attribution));
}
