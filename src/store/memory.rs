//! In-memory store implementations for testing and development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::{InvoiceId, InvoiceRecord, StoreError};

use super::artifact::ArtifactStore;
use super::record::RecordStore;

fn lock_err<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Backend(format!("lock poisoned: {e}"))
}

#[derive(Debug, Default)]
struct RecordRows {
    rows: Vec<InvoiceRecord>,
    next_id: InvoiceId,
}

/// In-memory record store. Uses `RwLock` for thread-safe access; ids are
/// assigned sequentially starting at 1 and restart after `reset_schema`,
/// matching auto-increment semantics.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    inner: Arc<RwLock<RecordRows>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RecordRows {
                rows: Vec::new(),
                next_id: 1,
            })),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(
        &self,
        name: &str,
        email: &str,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<InvoiceId, StoreError> {
        let mut inner = self.inner.write().map_err(lock_err)?;
        let id = inner.next_id.max(1);
        inner.next_id = id + 1;
        inner.rows.push(InvoiceRecord {
            id,
            name: name.to_string(),
            email: email.to_string(),
            amount,
            created_at,
        });
        Ok(id)
    }

    async fn delete(&self, id: InvoiceId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(lock_err)?;
        let before = inner.rows.len();
        inner.rows.retain(|r| r.id != id);
        if inner.rows.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<InvoiceRecord>, StoreError> {
        let inner = self.inner.read().map_err(lock_err)?;
        let mut rows = inner.rows.clone();
        // Most recent first; id breaks timestamp ties (inserts within the
        // same instant).
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn email_for(&self, id: InvoiceId) -> Result<String, StoreError> {
        let inner = self.inner.read().map_err(lock_err)?;
        inner
            .rows
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.email.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn reset_schema(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(lock_err)?;
        inner.rows.clear();
        inner.next_id = 1;
        Ok(())
    }
}

/// In-memory document store: named containers of keyed byte blobs.
///
/// Object operations apply to the active container the store was created
/// with; container-lifecycle operations take explicit names.
#[derive(Clone)]
pub struct InMemoryArtifactStore {
    active: String,
    containers: Arc<RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>>,
}

impl InMemoryArtifactStore {
    /// Create the store with an existing, empty active container.
    pub fn new(active: impl Into<String>) -> Self {
        let active = active.into();
        let mut containers = HashMap::new();
        containers.insert(active.clone(), BTreeMap::new());
        Self {
            active,
            containers: Arc::new(RwLock::new(containers)),
        }
    }

    pub fn active_container(&self) -> &str {
        &self.active
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut containers = self.containers.write().map_err(lock_err)?;
        let container = containers
            .get_mut(&self.active)
            .ok_or_else(|| StoreError::Backend(format!("container '{}' does not exist", self.active)))?;
        container.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let containers = self.containers.read().map_err(lock_err)?;
        containers
            .get(&self.active)
            .and_then(|c| c.get(key))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut containers = self.containers.write().map_err(lock_err)?;
        let container = containers.get_mut(&self.active).ok_or(StoreError::NotFound)?;
        container.remove(key).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list_keys(&self, container: &str) -> Result<Vec<String>, StoreError> {
        let containers = self.containers.read().map_err(lock_err)?;
        containers
            .get(container)
            .map(|c| c.keys().cloned().collect())
            .ok_or(StoreError::NotFound)
    }

    async fn container_exists(&self, name: &str) -> Result<bool, StoreError> {
        let containers = self.containers.read().map_err(lock_err)?;
        Ok(containers.contains_key(name))
    }

    async fn create_container(&self, name: &str) -> Result<(), StoreError> {
        let mut containers = self.containers.write().map_err(lock_err)?;
        containers.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn delete_container(&self, name: &str) -> Result<(), StoreError> {
        let mut containers = self.containers.write().map_err(lock_err)?;
        containers.remove(name).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
