//! In-memory implementation of DataStore for testing and development

use crate::core::error::StoreError;
use crate::core::query::QueryDescriptor;
use crate::core::store::{DataStore, Page, QueryableStore, Row};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

type Tables = HashMap<String, IndexMap<String, Row>>;

/// In-memory data store
///
/// Rows are kept per entity in insertion order, which is the natural order
/// ties fall back to when sorting. Missing `id`, `created_at` and
/// `updated_at` columns are filled on insert the way database defaults
/// would be.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    unique: Arc<HashMap<String, HashSet<String>>>,
}

impl InMemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject inserts and updates that duplicate `field` within `entity`
    pub fn with_unique(mut self, entity: &str, field: &str) -> Self {
        Arc::make_mut(&mut self.unique)
            .entry(entity.to_string())
            .or_default()
            .insert(field.to_string());
        self
    }

    /// Insert rows as-is, bypassing uniqueness checks
    pub fn seed(
        &self,
        entity: &str,
        rows: impl IntoIterator<Item = Row>,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let table = tables.entry(entity.to_string()).or_default();
        for row in rows {
            let row = with_defaults(row);
            table.insert(row_id(&row), row);
        }
        Ok(())
    }

    /// Number of rows stored for `entity`
    pub fn count(&self, entity: &str) -> Result<usize, StoreError> {
        Ok(self.read()?.get(entity).map_or(0, IndexMap::len))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|e| StoreError::Unavailable(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|e| StoreError::Unavailable(format!("Failed to acquire write lock: {}", e)))
    }

    fn check_unique(
        &self,
        entity: &str,
        table: &IndexMap<String, Row>,
        row: &Row,
        own_id: &str,
    ) -> Result<(), StoreError> {
        let Some(fields) = self.unique.get(entity) else {
            return Ok(());
        };
        for field in fields {
            let Some(value) = row.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = table
                .iter()
                .any(|(id, other)| id != own_id && other.get(field) == Some(value));
            if taken {
                return Err(StoreError::Conflict(format!(
                    "duplicate key value violates unique constraint \"{}_{}_key\"",
                    entity, field
                )));
            }
        }
        Ok(())
    }
}

impl QueryableStore for InMemoryStore {}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn query(&self, entity: &str, descriptor: &QueryDescriptor) -> Result<Page, StoreError> {
        let rows: Vec<Row> = self
            .read()?
            .get(entity)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default();
        Ok(self.evaluate(rows, descriptor))
    }

    async fn fetch(&self, entity: &str, id: &str) -> Result<Option<Row>, StoreError> {
        Ok(self
            .read()?
            .get(entity)
            .and_then(|table| table.get(id))
            .cloned())
    }

    async fn insert(&self, entity: &str, row: Row) -> Result<Row, StoreError> {
        let row = with_defaults(row);
        let id = row_id(&row);

        let mut tables = self.write()?;
        let table = tables.entry(entity.to_string()).or_default();
        if table.contains_key(&id) {
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint \"{}_pkey\"",
                entity
            )));
        }
        self.check_unique(entity, table, &row, &id)?;

        table.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, entity: &str, id: &str, patch: Row) -> Result<Option<Row>, StoreError> {
        let mut tables = self.write()?;
        let Some(table) = tables.get_mut(entity) else {
            return Ok(None);
        };
        let Some(current) = table.get(id) else {
            return Ok(None);
        };

        let mut merged = current.clone();
        merged.extend(patch);
        // The key is immutable.
        merged.insert("id".to_string(), Value::String(id.to_string()));
        self.check_unique(entity, table, &merged, id)?;

        table.insert(id.to_string(), merged.clone());
        Ok(Some(merged))
    }

    async fn delete(&self, entity: &str, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        Ok(tables
            .get_mut(entity)
            .and_then(|table| table.shift_remove(id))
            .is_some())
    }
}

fn with_defaults(mut row: Row) -> Row {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    if row.get("id").is_none_or(Value::is_null) {
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    for column in ["created_at", "updated_at"] {
        if row.get(column).is_none_or(Value::is_null) {
            row.insert(column.to_string(), Value::String(now.clone()));
        }
    }
    row
}

fn row_id(row: &Row) -> String {
    match row.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::{FilterOp, FilterSet, SortDirection};
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().expect("object")
    }

    #[tokio::test]
    async fn test_insert_fills_defaults() {
        let store = InMemoryStore::new();
        let stored = store
            .insert("committees", row(json!({"name": "Board"})))
            .await
            .unwrap();

        let id = stored["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert!(stored["created_at"].is_string());

        let fetched = store.fetch("committees", id).await.unwrap();
        assert_eq!(fetched, Some(stored));
    }

    #[tokio::test]
    async fn test_query_filters_sorts_and_pages() {
        let store = InMemoryStore::new();
        store
            .seed(
                "seasons",
                (1..=7).map(|i| row(json!({"id": i.to_string(), "year": 2020 + (i % 3)}))),
            )
            .unwrap();

        let descriptor = QueryDescriptor::new()
            .with_filters(FilterSet::new().and("year", FilterOp::Gte, json!(2021)))
            .sort_by("year", SortDirection::Descending)
            .paginate(1, 2);
        let page = store.query("seasons", &descriptor).await.unwrap();

        assert_eq!(page.total, 5);
        let ids: Vec<_> = page.rows.iter().map(|r| r["id"].clone()).collect();
        // year 2022: ids 2, 5 in insertion order
        assert_eq!(ids, vec![json!("2"), json!("5")]);
    }

    #[tokio::test]
    async fn test_unique_constraint_conflict() {
        let store = InMemoryStore::new().with_unique("clubs", "name");
        store
            .insert("clubs", row(json!({"name": "Rovers"})))
            .await
            .unwrap();
        let err = store
            .insert("clubs", row(json!({"name": "Rovers"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(msg) if msg.contains("duplicate key")));
        assert_eq!(store.count("clubs").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_key() {
        let store = InMemoryStore::new();
        store
            .seed("todos", [row(json!({"id": "t1", "title": "Nets", "done": false}))])
            .unwrap();

        let updated = store
            .update("todos", "t1", row(json!({"done": true, "id": "other"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["id"], "t1");
        assert_eq!(updated["title"], "Nets");
        assert_eq!(updated["done"], true);

        assert!(store.update("todos", "missing", Row::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::new();
        store.seed("videos", [row(json!({"id": "v1"}))]).unwrap();
        assert!(store.delete("videos", "v1").await.unwrap());
        assert!(!store.delete("videos", "v1").await.unwrap());
        assert!(!store.delete("unknown", "v1").await.unwrap());
    }
}
