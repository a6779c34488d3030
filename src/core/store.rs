//! Data store seam
//!
//! The store is an opaque collaborator keyed by entity name. It receives
//! already-validated descriptors and returns rows or a [`StoreError`].

use crate::core::error::StoreError;
use crate::core::query::{QueryDescriptor, SortKey, compare_rows};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One record, as a JSON object
pub type Row = Map<String, Value>;

/// Rows of one page plus the number of rows matching the filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<Row>,
    pub total: usize,
}

/// Query/mutate interface of the backing store
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Rows of `entity` matching the descriptor, sorted and paginated
    async fn query(&self, entity: &str, descriptor: &QueryDescriptor) -> Result<Page, StoreError>;

    /// One row by primary key
    async fn fetch(&self, entity: &str, id: &str) -> Result<Option<Row>, StoreError>;

    /// Insert a row and return it as stored
    async fn insert(&self, entity: &str, row: Row) -> Result<Row, StoreError>;

    /// Merge `patch` into an existing row; `None` when the key is missing
    async fn update(&self, entity: &str, id: &str, patch: Row) -> Result<Option<Row>, StoreError>;

    /// Remove a row; `false` when the key is missing
    async fn delete(&self, entity: &str, id: &str) -> Result<bool, StoreError>;
}

/// Row-level filtering and sorting for stores that evaluate descriptors
/// themselves (in-memory and test doubles)
pub trait QueryableStore: Send + Sync {
    /// Keep rows matching every predicate
    fn apply_filters(&self, rows: Vec<Row>, descriptor: &QueryDescriptor) -> Vec<Row> {
        if descriptor.filters().is_empty() {
            return rows;
        }
        rows.into_iter()
            .filter(|row| descriptor.filters().matches(row))
            .collect()
    }

    /// Stable sort by the descriptor's keys, so ties keep storage order
    fn apply_sort(&self, mut rows: Vec<Row>, sort: &[SortKey]) -> Vec<Row> {
        if !sort.is_empty() {
            rows.sort_by(|a, b| compare_rows(a, b, sort));
        }
        rows
    }

    /// Filter, sort and cut one page
    fn evaluate(&self, rows: Vec<Row>, descriptor: &QueryDescriptor) -> Page {
        let rows = self.apply_filters(rows, descriptor);
        let total = rows.len();
        let rows = self.apply_sort(rows, descriptor.sort());

        let rows = match descriptor.pagination() {
            Some(p) => rows.into_iter().skip(p.offset()).take(p.limit).collect(),
            None => rows,
        };
        Page { rows, total }
    }
}
