//! Persistent records (spec §3, "PersistentRecord").
//!
//! An author-declared tabular object with named fields, backed by an
//! opaque store. Per spec §1 the concrete backend is an external
//! collaborator — this crate only defines the trait the engine's
//! `Response::load`/`Response::store` dispatch through.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StoreError;

/// A loaded (or about-to-be-stored) record instance.
///
/// `key_field` names which entry in `fields` a backend should treat as
/// the row identity for `PersistentStore::store` — it is set from the
/// `key_field` argument the record was `load`ed with, so a round trip of
/// `load` then `store` upserts the same row without the backend having
/// to guess which field is the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordInstance {
    pub name: String,
    pub key_field: String,
    pub fields: HashMap<String, String>,
}

impl RecordInstance {
    pub fn new(name: impl Into<String>, key_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_field: key_field.into(),
            fields: HashMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn key_value(&self) -> Option<&str> {
        self.field(&self.key_field)
    }
}

/// Persistent-store contract (spec §6): `load` fetches a record by a
/// key-field/key-value pair plus an opaque `where` clause forwarded
/// untouched to the backend; `store` upserts.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn load(
        &self,
        record: &str,
        key_field: &str,
        key_value: &str,
        where_clause: Option<&str>,
    ) -> Result<Option<RecordInstance>, StoreError>;

    async fn store(&self, record: &RecordInstance) -> Result<(), StoreError>;
}
