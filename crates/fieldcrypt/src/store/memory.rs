//! [`MemoryStore`]: in-process record table for local development and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{FieldMap, Record, RecordId};
use tokio::sync::RwLock;

use super::{RecordStore, StoreError};

/// Async-safe in-memory table keyed by [`RecordId`].
///
/// Clones share the same table.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<BTreeMap<RecordId, FieldMap>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a whole row.
    pub async fn insert(&self, id: impl Into<RecordId>, fields: FieldMap) {
        self.rows.write().await.insert(id.into(), fields);
    }

    /// Return a copy of one row.
    pub async fn get(&self, id: &RecordId) -> Option<FieldMap> {
        self.rows.read().await.get(id).cloned()
    }

    /// Number of rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all(&self, fields: &[String]) -> Result<Vec<Record>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .map(|(id, row)| {
                let projected: FieldMap = fields
                    .iter()
                    .filter_map(|f| row.get(f).map(|v| (f.clone(), v.clone())))
                    .collect();
                Record::new(id.clone(), projected)
            })
            .collect())
    }

    async fn update_by_id(&self, id: &RecordId, fields: FieldMap) -> Result<(), StoreError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        row.extend(fields);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, serde_json::Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn fetch_all_projects_requested_fields() {
        let store = MemoryStore::new();
        store
            .insert(
                "1",
                row(&[("name", json!("Family A")), ("owner_password", json!("pw"))]),
            )
            .await;

        let records = store
            .fetch_all(&["owner_password".to_owned()])
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].str_field("owner_password"), Some("pw"));
        assert!(records[0].fields.get("name").is_none());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryStore::new();
        store
            .insert("1", row(&[("name", json!("A")), ("owner_password", json!("old"))]))
            .await;
        store
            .update_by_id(&RecordId::from("1"), row(&[("owner_password", json!("new"))]))
            .await
            .unwrap();
        let stored = store.get(&RecordId::from("1")).await.unwrap();
        assert_eq!(stored["owner_password"], "new");
        assert_eq!(stored["name"], "A");
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_by_id(&RecordId::from("missing"), FieldMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.is_empty().await);
    }
}
