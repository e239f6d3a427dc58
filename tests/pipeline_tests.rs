use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use rechnungslauf::core::*;
use rechnungslauf::pipeline::{DEFAULT_CONTAINER, Fulfillment};
use rechnungslauf::render::{DocumentRenderer, PlainTextRenderer};
use rechnungslauf::store::{
    ArtifactStore, InMemoryArtifactStore, InMemoryRecordStore, RecordStore, document_key,
};

fn draft() -> InvoiceDraft {
    InvoiceDraft {
        name: "acme".into(),
        address1: "1 Main St".into(),
        address2: String::new(),
        city: "Springfield".into(),
        state: "IL".into(),
        postcode: "00000".into(),
        email: "a@b.com".into(),
        lines: vec![RawLine::new("Widget", "2", "5.0")],
    }
}

fn pipeline() -> (Fulfillment, InMemoryRecordStore, InMemoryArtifactStore) {
    let records = InMemoryRecordStore::new();
    let artifacts = InMemoryArtifactStore::new(DEFAULT_CONTAINER);
    let fulfillment = Fulfillment::new(
        Arc::new(records.clone()),
        Arc::new(artifacts.clone()),
        Arc::new(PlainTextRenderer),
    );
    (fulfillment, records, artifacts)
}

/// Artifact store whose object writes always fail; everything else
/// delegates to the in-memory store.
struct RejectingPuts(InMemoryArtifactStore);

#[async_trait]
impl ArtifactStore for RejectingPuts {
    async fn put(&self, _key: &str, _bytes: Vec<u8>) -> Result<(), StoreError> {
        Err(StoreError::Backend("injected put failure".into()))
    }
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.0.get(key).await
    }
    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.0.delete(key).await
    }
    async fn list_keys(&self, container: &str) -> Result<Vec<String>, StoreError> {
        self.0.list_keys(container).await
    }
    async fn container_exists(&self, name: &str) -> Result<bool, StoreError> {
        self.0.container_exists(name).await
    }
    async fn create_container(&self, name: &str) -> Result<(), StoreError> {
        self.0.create_container(name).await
    }
    async fn delete_container(&self, name: &str) -> Result<(), StoreError> {
        self.0.delete_container(name).await
    }
}

/// As above, but object deletes fail.
struct RejectingDeletes(InMemoryArtifactStore);

#[async_trait]
impl ArtifactStore for RejectingDeletes {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.0.put(key, bytes).await
    }
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.0.get(key).await
    }
    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("injected delete failure".into()))
    }
    async fn list_keys(&self, container: &str) -> Result<Vec<String>, StoreError> {
        self.0.list_keys(container).await
    }
    async fn container_exists(&self, name: &str) -> Result<bool, StoreError> {
        self.0.container_exists(name).await
    }
    async fn create_container(&self, name: &str) -> Result<(), StoreError> {
        self.0.create_container(name).await
    }
    async fn delete_container(&self, name: &str) -> Result<(), StoreError> {
        self.0.delete_container(name).await
    }
}

struct BrokenRenderer;

impl DocumentRenderer for BrokenRenderer {
    fn render(&self, _data: &DocumentData) -> Result<Vec<u8>, RenderError> {
        Err(RenderError("injected render failure".into()))
    }
}

// --- Create workflow ---

#[tokio::test]
async fn create_persists_record_and_stores_document() {
    let (fulfillment, records, artifacts) = pipeline();

    let created = fulfillment.create(&draft()).await.unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.total, dec!(10.0));

    let rows = records.list_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "acme");
    assert_eq!(rows[0].email, "a@b.com");
    assert_eq!(rows[0].amount, dec!(10.0));

    let bytes = artifacts.get("1.pdf").await.unwrap();
    assert!(!bytes.is_empty());
}

#[tokio::test]
async fn blank_lines_are_excluded_from_totals() {
    let (fulfillment, _, _) = pipeline();
    let mut d = draft();
    d.lines = vec![RawLine::new("Widget", "3", "2"), RawLine::blank()];

    let created = fulfillment.create(&d).await.unwrap();
    assert_eq!(created.total, dec!(6));
}

#[tokio::test]
async fn invalid_email_halts_before_any_side_effect() {
    let (fulfillment, records, artifacts) = pipeline();
    let mut d = draft();
    d.email = "not-an-email".into();

    let err = fulfillment.create(&d).await.unwrap_err();
    match err {
        FulfillmentError::Validation(violations) => {
            assert!(violations.iter().any(|v| *v == Violation::InvalidEmail));
        }
        other => panic!("expected validation error, got: {other}"),
    }

    assert!(records.list_all().await.unwrap().is_empty());
    assert!(
        artifacts
            .list_keys(DEFAULT_CONTAINER)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn missing_lines_means_no_totals_and_no_record() {
    let (fulfillment, records, _) = pipeline();
    let mut d = draft();
    d.lines = vec![RawLine::blank(), RawLine::blank()];

    let err = fulfillment.create(&d).await.unwrap_err();
    match err {
        FulfillmentError::Validation(violations) => {
            assert!(violations.iter().any(|v| *v == Violation::MissingLines));
        }
        other => panic!("expected validation error, got: {other}"),
    }
    assert!(records.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn ids_increase_and_listing_is_most_recent_first() {
    let (fulfillment, _, _) = pipeline();
    for _ in 0..3 {
        fulfillment.create(&draft()).await.unwrap();
    }
    let ids: Vec<_> = fulfillment
        .list()
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[tokio::test]
async fn document_store_failure_surfaces_the_orphaned_record() {
    let records = InMemoryRecordStore::new();
    let inner = InMemoryArtifactStore::new(DEFAULT_CONTAINER);
    let fulfillment = Fulfillment::new(
        Arc::new(records.clone()),
        Arc::new(RejectingPuts(inner.clone())),
        Arc::new(PlainTextRenderer),
    );

    let err = fulfillment.create(&draft()).await.unwrap_err();
    assert!(err.is_partial_failure());
    match err {
        FulfillmentError::RecordWithoutDocument { id, step, .. } => {
            assert_eq!(id, 1);
            assert_eq!(step, Step::StoreDocument);
        }
        other => panic!("expected RecordWithoutDocument, got: {other}"),
    }

    // The record is deliberately left in place for reconciliation.
    assert_eq!(records.list_all().await.unwrap().len(), 1);
    let report = fulfillment.reconcile().await.unwrap();
    assert_eq!(report.records_without_documents, vec![1]);
    assert!(report.documents_without_records.is_empty());
}

#[tokio::test]
async fn render_failure_also_leaves_the_record_flagged() {
    let records = InMemoryRecordStore::new();
    let artifacts = InMemoryArtifactStore::new(DEFAULT_CONTAINER);
    let fulfillment = Fulfillment::new(
        Arc::new(records.clone()),
        Arc::new(artifacts),
        Arc::new(BrokenRenderer),
    );

    let err = fulfillment.create(&draft()).await.unwrap_err();
    match err {
        FulfillmentError::RecordWithoutDocument { id, step, .. } => {
            assert_eq!(id, 1);
            assert_eq!(step, Step::RenderDocument);
        }
        other => panic!("expected RecordWithoutDocument, got: {other}"),
    }
    assert_eq!(records.list_all().await.unwrap().len(), 1);
}

// --- Delete workflow ---

#[tokio::test]
async fn delete_removes_record_then_document() {
    let (fulfillment, records, artifacts) = pipeline();
    let created = fulfillment.create(&draft()).await.unwrap();

    fulfillment.delete(created.id).await.unwrap();

    assert!(records.list_all().await.unwrap().is_empty());
    assert_eq!(
        artifacts.get(&document_key(created.id)).await,
        Err(StoreError::NotFound)
    );
}

#[tokio::test]
async fn delete_of_missing_id_does_not_touch_documents() {
    let (fulfillment, _, artifacts) = pipeline();
    fulfillment.create(&draft()).await.unwrap();

    let err = fulfillment.delete(99).await.unwrap_err();
    match err {
        FulfillmentError::Persistence { step, source } => {
            assert_eq!(step, Step::DeleteRecord);
            assert_eq!(source, StoreError::NotFound);
        }
        other => panic!("expected persistence error, got: {other}"),
    }

    // Existing document untouched.
    assert!(artifacts.get("1.pdf").await.is_ok());
}

#[tokio::test]
async fn document_delete_failure_names_the_orphaned_key() {
    let records = InMemoryRecordStore::new();
    let inner = InMemoryArtifactStore::new(DEFAULT_CONTAINER);
    let fulfillment = Fulfillment::new(
        Arc::new(records.clone()),
        Arc::new(RejectingDeletes(inner.clone())),
        Arc::new(PlainTextRenderer),
    );
    let created = fulfillment.create(&draft()).await.unwrap();

    let err = fulfillment.delete(created.id).await.unwrap_err();
    assert!(err.is_partial_failure());
    match err {
        FulfillmentError::OrphanedDocument { key, .. } => assert_eq!(key, "1.pdf"),
        other => panic!("expected OrphanedDocument, got: {other}"),
    }

    // Record gone, document still present — the reported orphan.
    assert!(records.list_all().await.unwrap().is_empty());
    assert!(inner.get("1.pdf").await.is_ok());
}

// --- Download ---

#[tokio::test]
async fn fetch_document_returns_stored_bytes() {
    let (fulfillment, _, artifacts) = pipeline();
    let created = fulfillment.create(&draft()).await.unwrap();

    let bytes = fulfillment.fetch_document(created.id).await.unwrap();
    assert_eq!(bytes, artifacts.get("1.pdf").await.unwrap());
}

#[tokio::test]
async fn fetch_of_missing_document_is_an_artifact_error() {
    let (fulfillment, _, _) = pipeline();
    let err = fulfillment.fetch_document(5).await.unwrap_err();
    match err {
        FulfillmentError::Artifact { step, source } => {
            assert_eq!(step, Step::FetchDocument);
            assert_eq!(source, StoreError::NotFound);
        }
        other => panic!("expected artifact error, got: {other}"),
    }
}

// --- Reset workflow ---

#[tokio::test]
async fn reset_clears_both_stores_and_recreates_the_container() {
    let (fulfillment, records, artifacts) = pipeline();
    fulfillment.create(&draft()).await.unwrap();
    fulfillment.create(&draft()).await.unwrap();

    let outcome = fulfillment.reset_all().await;
    assert!(outcome.is_ok());

    assert!(records.list_all().await.unwrap().is_empty());
    assert!(artifacts.container_exists(DEFAULT_CONTAINER).await.unwrap());
    assert!(
        artifacts
            .list_keys(DEFAULT_CONTAINER)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn reset_succeeds_when_the_container_does_not_exist() {
    let (fulfillment, _, artifacts) = pipeline();
    artifacts.delete_container(DEFAULT_CONTAINER).await.unwrap();

    let outcome = fulfillment.reset_all().await;
    assert!(outcome.schema.is_ok());
    assert!(outcome.container.is_ok());
    assert!(artifacts.container_exists(DEFAULT_CONTAINER).await.unwrap());
}

#[tokio::test]
async fn reset_restarts_id_assignment() {
    let (fulfillment, _, _) = pipeline();
    fulfillment.create(&draft()).await.unwrap();
    fulfillment.reset_all().await;

    let created = fulfillment.create(&draft()).await.unwrap();
    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn schema_failure_does_not_abort_the_container_step() {
    struct BrokenSchema(InMemoryRecordStore);

    #[async_trait]
    impl RecordStore for BrokenSchema {
        async fn insert(
            &self,
            name: &str,
            email: &str,
            amount: rust_decimal::Decimal,
            created_at: chrono::DateTime<chrono::Utc>,
        ) -> Result<InvoiceId, StoreError> {
            self.0.insert(name, email, amount, created_at).await
        }
        async fn delete(&self, id: InvoiceId) -> Result<(), StoreError> {
            self.0.delete(id).await
        }
        async fn list_all(&self) -> Result<Vec<InvoiceRecord>, StoreError> {
            self.0.list_all().await
        }
        async fn email_for(&self, id: InvoiceId) -> Result<String, StoreError> {
            self.0.email_for(id).await
        }
        async fn reset_schema(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend("injected schema failure".into()))
        }
    }

    let artifacts = InMemoryArtifactStore::new(DEFAULT_CONTAINER);
    let fulfillment = Fulfillment::new(
        Arc::new(BrokenSchema(InMemoryRecordStore::new())),
        Arc::new(artifacts.clone()),
        Arc::new(PlainTextRenderer),
    );
    artifacts.put("1.pdf", vec![1]).await.unwrap();

    let outcome = fulfillment.reset_all().await;
    assert!(outcome.schema.is_err());
    // The container step still ran to completion.
    assert!(outcome.container.is_ok());
    assert!(
        artifacts
            .list_keys(DEFAULT_CONTAINER)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn reset_and_create_serialize_without_deadlock() {
    let (fulfillment, _, _) = pipeline();
    let fulfillment = Arc::new(fulfillment);

    let a = {
        let f = Arc::clone(&fulfillment);
        tokio::spawn(async move { f.reset_all().await.is_ok() })
    };
    let b = {
        let f = Arc::clone(&fulfillment);
        tokio::spawn(async move { f.create(&draft()).await })
    };

    // The exclusive gate orders the two workflows; both must complete.
    assert!(a.await.unwrap());
    let _ = b.await.unwrap();

    // Afterwards the pipeline is fully operational against the container.
    assert!(fulfillment.create(&draft()).await.is_ok());
}

// --- Reconciliation ---

#[tokio::test]
async fn reconcile_reports_agreement_after_normal_operation() {
    let (fulfillment, _, _) = pipeline();
    fulfillment.create(&draft()).await.unwrap();
    fulfillment.create(&draft()).await.unwrap();

    let report = fulfillment.reconcile().await.unwrap();
    assert!(report.is_consistent());
}

#[tokio::test]
async fn reconcile_reports_stray_documents() {
    let (fulfillment, _, artifacts) = pipeline();
    fulfillment.create(&draft()).await.unwrap();
    artifacts.put("99.pdf", vec![0]).await.unwrap();

    let report = fulfillment.reconcile().await.unwrap();
    assert_eq!(report.documents_without_records, vec!["99.pdf".to_string()]);
    assert!(report.records_without_documents.is_empty());
}
