//! Reference `PersistentStore` implementation.
//!
//! Per spec §1, persistent user storage is an external collaborator — the
//! engine only ever talks to the `PersistentStore` trait in
//! `dialog-engine-core`. `InMemoryStore` is the reference backend used in
//! tests and as the simplest possible adapter, the same role
//! `InMemorySessionStore` plays in the teacher workspace's session-store
//! hierarchy: a default, non-persistent implementation that satisfies the
//! trait fully so the rest of the system never has to special-case it.

use std::collections::HashMap;

use async_trait::async_trait;
use dialog_engine_core::{PersistentStore, RecordInstance, StoreError};
use parking_lot::RwLock;

/// Composite key: which record, which field identifies a row, and the
/// value of that field for this particular row.
type RowKey = (String, String, String);

/// An in-memory, process-local `PersistentStore`.
///
/// `where_clause` is accepted (per the trait contract) but ignored: an
/// in-memory reference store has no query planner to forward an opaque
/// clause to. A production backend is expected to honor it.
#[derive(Default)]
pub struct InMemoryStore {
    rows: RwLock<HashMap<RowKey, RecordInstance>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(record: &str, key_field: &str, key_value: &str) -> RowKey {
        (record.to_string(), key_field.to_string(), key_value.to_string())
    }
}

#[async_trait]
impl PersistentStore for InMemoryStore {
    async fn load(
        &self,
        record: &str,
        key_field: &str,
        key_value: &str,
        _where_clause: Option<&str>,
    ) -> Result<Option<RecordInstance>, StoreError> {
        Ok(self
            .rows
            .read()
            .get(&Self::key(record, key_field, key_value))
            .cloned())
    }

    async fn store(&self, record: &RecordInstance) -> Result<(), StoreError> {
        let key_value = record.key_value().ok_or_else(|| {
            StoreError::Backend(format!(
                "record `{}` has no value for its key field `{}`",
                record.name, record.key_field
            ))
        })?;
        let key = Self::key(&record.name, &record.key_field, key_value);
        self.rows.write().insert(key, record.clone());
        Ok(())
    }
}
