//! The fulfillment coordinator: create, delete, reset, download, list, and
//! reconcile workflows across the record store and the document store.
//!
//! The two stores share no transaction. The coordinator keeps them in
//! best-effort agreement by ordering ("persist record, then render and store
//! document", "delete record, then delete document") and by surfacing
//! partial failures as errors that name the completed and failed steps; it
//! never rolls back a completed step. The worst-case inconsistency is a
//! record without a document, detectable with [`Fulfillment::reconcile`].

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::core::{
    DocumentData, FulfillmentError, InvoiceDraft, InvoiceId, InvoiceRecord, Step, StoreError,
    Violations, compute_totals, validate_draft, validated_lines,
};
use crate::render::DocumentRenderer;
use crate::store::{ArtifactStore, RecordStore, document_key};

/// Container name used unless overridden with [`Fulfillment::with_container`].
pub const DEFAULT_CONTAINER: &str = "invoices";

/// Result of a successful create workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInvoice {
    pub id: InvoiceId,
    pub total: Decimal,
}

/// Outcome of the two independent reset steps. Both steps are always
/// attempted; neither aborts the other.
#[derive(Debug)]
pub struct ResetOutcome {
    /// Drop-and-recreate of the record store schema.
    pub schema: Result<(), StoreError>,
    /// Teardown and recreation of the document container.
    pub container: Result<(), StoreError>,
}

impl ResetOutcome {
    pub fn is_ok(&self) -> bool {
        self.schema.is_ok() && self.container.is_ok()
    }
}

/// Result of a reconciliation sweep. Read-only: no repairs are performed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// Ids of records whose document key is missing from the container.
    pub records_without_documents: Vec<InvoiceId>,
    /// Keys in the container that match no record.
    pub documents_without_records: Vec<String>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.records_without_documents.is_empty() && self.documents_without_records.is_empty()
    }
}

/// The fulfillment coordinator.
///
/// Each workflow runs its steps sequentially to completion or failure; there
/// are no retries and no background work. The destructive reset workflow is
/// serialized behind an exclusive gate so it cannot interleave with a
/// mid-flight create, delete, or download.
pub struct Fulfillment {
    records: Arc<dyn RecordStore>,
    artifacts: Arc<dyn ArtifactStore>,
    renderer: Arc<dyn DocumentRenderer>,
    container: String,
    gate: RwLock<()>,
}

impl Fulfillment {
    pub fn new(
        records: Arc<dyn RecordStore>,
        artifacts: Arc<dyn ArtifactStore>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            records,
            artifacts,
            renderer,
            container: DEFAULT_CONTAINER.to_string(),
            gate: RwLock::new(()),
        }
    }

    pub fn with_container(mut self, name: impl Into<String>) -> Self {
        self.container = name.into();
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Run the create workflow:
    /// validate → totals → persist record → render → store document.
    ///
    /// Validation failures abort before any side effect. A failure after the
    /// record insert returns [`FulfillmentError::RecordWithoutDocument`]
    /// naming the persisted id — the record is deliberately left in place
    /// (see [`Fulfillment::reconcile`]).
    pub async fn create(&self, draft: &InvoiceDraft) -> Result<CreatedInvoice, FulfillmentError> {
        let _shared = self.gate.read().await;

        let violations = validate_draft(draft);
        if !violations.is_empty() {
            debug!("create rejected: {} violation(s)", violations.len());
            return Err(FulfillmentError::Validation(Violations(violations)));
        }

        let totals = compute_totals(&validated_lines(&draft.lines));
        let total = totals.total;

        let id = self
            .records
            .insert(&draft.name, &draft.email, total, Utc::now())
            .await
            .map_err(|source| FulfillmentError::Persistence {
                step: Step::PersistRecord,
                source,
            })?;

        let data = DocumentData::new(draft, &totals);
        let bytes = match self.renderer.render(&data) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("invoice #{id}: record saved but rendering failed: {e}");
                return Err(FulfillmentError::RecordWithoutDocument {
                    id,
                    step: Step::RenderDocument,
                    cause: e.to_string(),
                });
            }
        };

        let key = document_key(id);
        if let Err(source) = self.artifacts.put(&key, bytes).await {
            warn!("invoice #{id}: record saved but document upload failed: {source}");
            return Err(FulfillmentError::RecordWithoutDocument {
                id,
                step: Step::StoreDocument,
                cause: source.to_string(),
            });
        }

        info!("invoice #{id} created, total {total}");
        Ok(CreatedInvoice { id, total })
    }

    /// Run the delete workflow: record first, then document.
    ///
    /// If the record delete fails (including not-found) the document is not
    /// touched — both stores are still consistent. If only the document
    /// delete fails, the error names the orphaned key; the record is not
    /// restored.
    pub async fn delete(&self, id: InvoiceId) -> Result<(), FulfillmentError> {
        let _shared = self.gate.read().await;

        self.records
            .delete(id)
            .await
            .map_err(|source| FulfillmentError::Persistence {
                step: Step::DeleteRecord,
                source,
            })?;

        let key = document_key(id);
        if let Err(source) = self.artifacts.delete(&key).await {
            warn!("invoice #{id}: record deleted but document '{key}' remains: {source}");
            return Err(FulfillmentError::OrphanedDocument { key, source });
        }

        info!("invoice #{id} deleted");
        Ok(())
    }

    /// All invoice records, most recent first.
    pub async fn list(&self) -> Result<Vec<InvoiceRecord>, FulfillmentError> {
        self.records
            .list_all()
            .await
            .map_err(|source| FulfillmentError::Persistence {
                step: Step::ListRecords,
                source,
            })
    }

    /// Fetch the stored document bytes for an invoice.
    pub async fn fetch_document(&self, id: InvoiceId) -> Result<Vec<u8>, FulfillmentError> {
        let _shared = self.gate.read().await;
        self.artifacts
            .get(&document_key(id))
            .await
            .map_err(|source| FulfillmentError::Artifact {
                step: Step::FetchDocument,
                source,
            })
    }

    /// Destructive bulk reset, intended for non-production use.
    ///
    /// Resets the record schema and tears down and recreates the document
    /// container. The two steps have independent failure domains: both are
    /// attempted regardless of the other's outcome, and the returned
    /// [`ResetOutcome`] reports each separately. Runs under the exclusive
    /// gate, so no other workflow can interleave.
    pub async fn reset_all(&self) -> ResetOutcome {
        let _exclusive = self.gate.write().await;
        info!("resetting record schema and document container");

        let schema = self.records.reset_schema().await;
        if let Err(e) = &schema {
            warn!("schema reset failed: {e}");
        }

        let container = self.reset_container().await;
        if let Err(e) = &container {
            warn!("container reset failed: {e}");
        }

        ResetOutcome { schema, container }
    }

    /// Delete every object, drop the container if present, then recreate it
    /// empty. A missing container is not an error.
    async fn reset_container(&self) -> Result<(), StoreError> {
        if self.artifacts.container_exists(&self.container).await? {
            for key in self.artifacts.list_keys(&self.container).await? {
                self.artifacts.delete(&key).await?;
            }
            self.artifacts.delete_container(&self.container).await?;
        }
        self.artifacts.create_container(&self.container).await
    }

    /// Read-only reconciliation sweep: compare record ids against document
    /// keys and report each side's orphans.
    pub async fn reconcile(&self) -> Result<ReconciliationReport, FulfillmentError> {
        let _shared = self.gate.read().await;

        let records = self
            .records
            .list_all()
            .await
            .map_err(|source| FulfillmentError::Persistence {
                step: Step::ListRecords,
                source,
            })?;
        let keys: BTreeSet<String> = self
            .artifacts
            .list_keys(&self.container)
            .await
            .map_err(|source| FulfillmentError::Artifact {
                step: Step::ListDocuments,
                source,
            })?
            .into_iter()
            .collect();

        let expected: BTreeSet<String> = records.iter().map(|r| document_key(r.id)).collect();

        let report = ReconciliationReport {
            records_without_documents: records
                .iter()
                .filter(|r| !keys.contains(&document_key(r.id)))
                .map(|r| r.id)
                .collect(),
            documents_without_records: keys
                .iter()
                .filter(|k| !expected.contains(*k))
                .cloned()
                .collect(),
        };

        if !report.is_consistent() {
            warn!(
                "stores out of agreement: {} record(s) without documents, {} stray document(s)",
                report.records_without_documents.len(),
                report.documents_without_records.len()
            );
        }
        Ok(report)
    }
}
