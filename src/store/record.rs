use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::{InvoiceId, InvoiceRecord, StoreError};

/// Adapter over the relational-style store holding invoice metadata.
///
/// Implementations must assign ids that are unique and strictly increasing
/// per successful insert; that is the only atomicity the pipeline relies on.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record and return its assigned id.
    async fn insert(
        &self,
        name: &str,
        email: &str,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<InvoiceId, StoreError>;

    /// Delete the record with the given id. `NotFound` if it does not exist.
    async fn delete(&self, id: InvoiceId) -> Result<(), StoreError>;

    /// All records, most recent first.
    async fn list_all(&self) -> Result<Vec<InvoiceRecord>, StoreError>;

    /// The email address stored for an invoice. `NotFound` if absent.
    async fn email_for(&self, id: InvoiceId) -> Result<String, StoreError>;

    /// Drop and recreate the backing schema: all records are gone and id
    /// assignment starts over.
    async fn reset_schema(&self) -> Result<(), StoreError>;
}
