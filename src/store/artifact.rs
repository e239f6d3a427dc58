use async_trait::async_trait;

use crate::core::{InvoiceId, StoreError};

/// Document-store key for an invoice's rendered document.
pub fn document_key(id: InvoiceId) -> String {
    format!("{id}.pdf")
}

/// Adapter over the blob-style store holding rendered invoice documents.
///
/// Objects live in the adapter's active container; the container-lifecycle
/// operations take explicit names so the reset workflow can tear down and
/// recreate containers.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store bytes under a key in the active container.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Fetch the bytes stored under a key. `NotFound` if absent.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Delete the object stored under a key. `NotFound` if absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// All keys in the named container. `NotFound` if the container
    /// does not exist.
    async fn list_keys(&self, container: &str) -> Result<Vec<String>, StoreError>;

    async fn container_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Create an empty container. Succeeds if it already exists.
    async fn create_container(&self, name: &str) -> Result<(), StoreError>;

    /// Delete a container. `NotFound` if it does not exist.
    async fn delete_container(&self, name: &str) -> Result<(), StoreError>;
}
