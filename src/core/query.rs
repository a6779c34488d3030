//! Query descriptors: filtering, sorting and pagination
//!
//! A [`QueryDescriptor`] describes one read request independent of any
//! entity. It is built once by the caller and only read afterwards.
//! [`QueryParams`] is its URL form:
//!
//! ```text
//! GET /api/entities/committees?page=1&limit=10&sort=sort_order:asc
//! GET /api/entities/grants?filter={"month>=": 3, "name~": "region"}
//! GET /api/entities/training_sessions?categoryId=42&sort=session_date:desc,session_time:desc
//! ```
//!
//! Filter keys carry an optional operator suffix: `!=`, `>`, `>=`, `<`, `<=`
//! and `~` (case-insensitive substring). A bare key with an array value is a
//! membership test.
//!
//! When rows are equal on every sort key their relative order is whatever
//! the store returns. Callers needing a stable order append a unique key
//! (usually `id`) as the last sort entry.

use crate::core::error::QueryError;
use crate::core::field::FieldValue;
use crate::core::schema::EntitySchema;
use crate::core::store::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Comparison operator of a filter predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
}

impl FilterOp {
    /// Split a wire filter key into field name and operator
    ///
    /// `"amount>="` yields `("amount", Gte)`; a key without suffix is `Eq`.
    pub fn split_key(key: &str) -> (&str, FilterOp) {
        const SUFFIXES: [(&str, FilterOp); 6] = [
            ("!=", FilterOp::Neq),
            (">=", FilterOp::Gte),
            ("<=", FilterOp::Lte),
            (">", FilterOp::Gt),
            ("<", FilterOp::Lt),
            ("~", FilterOp::Like),
        ];

        for (suffix, op) in SUFFIXES {
            if let Some(field) = key.strip_suffix(suffix) {
                return (field.trim_end(), op);
            }
        }
        (key, FilterOp::Eq)
    }

    fn suffix(self) -> &'static str {
        match self {
            FilterOp::Eq | FilterOp::In => "",
            FilterOp::Neq => "!=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::Like => "~",
        }
    }
}

/// One operator/value pair applied to a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub op: FilterOp,
    pub value: Value,
}

impl Predicate {
    /// Evaluate against a row's field value (`None` when the field is absent)
    pub fn matches(&self, actual: Option<&Value>) -> bool {
        let actual = actual.unwrap_or(&Value::Null);

        match self.op {
            FilterOp::Eq => scalar_eq(actual, &self.value),
            FilterOp::Neq => !scalar_eq(actual, &self.value),
            FilterOp::Gt => ordering(actual, &self.value) == Some(Ordering::Greater),
            FilterOp::Gte => matches!(
                ordering(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt => ordering(actual, &self.value) == Some(Ordering::Less),
            FilterOp::Lte => matches!(
                ordering(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOp::In => match &self.value {
                Value::Array(candidates) => candidates.iter().any(|c| scalar_eq(actual, c)),
                other => scalar_eq(actual, other),
            },
            FilterOp::Like => match (actual.as_str(), self.value.as_str()) {
                (Some(haystack), Some(needle)) => {
                    let needle = needle.trim_matches('%').to_lowercase();
                    haystack.to_lowercase().contains(&needle)
                }
                _ => false,
            },
        }
    }
}

fn ordering(actual: &Value, expected: &Value) -> Option<Ordering> {
    if actual.is_null() {
        return None;
    }
    FieldValue::from_json(actual).compare(&FieldValue::from_json(expected))
}

/// Equality that tolerates URL-borne strings compared against typed columns
fn scalar_eq(actual: &Value, expected: &Value) -> bool {
    match FieldValue::from_json(actual).compare(&FieldValue::from_json(expected)) {
        Some(ord) => ord == Ordering::Equal,
        None => match (scalar_text(actual), scalar_text(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => actual == expected,
        },
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Conjunctive set of predicates keyed by field name
///
/// An empty set matches every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    predicates: BTreeMap<String, Vec<Predicate>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate on `field`
    pub fn and(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.push(field.into(), op, value.into());
        self
    }

    fn push(&mut self, field: String, op: FilterOp, value: Value) {
        self.predicates
            .entry(field)
            .or_default()
            .push(Predicate { op, value });
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Field names referenced by this set
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.predicates
            .iter()
            .flat_map(|(field, preds)| preds.iter().map(move |p| (field.as_str(), p)))
    }

    /// True when every predicate holds for `row`
    pub fn matches(&self, row: &Row) -> bool {
        self.iter()
            .all(|(field, predicate)| predicate.matches(row.get(field)))
    }

    /// Parse the JSON object form used on the wire
    pub fn from_json(value: &Value) -> Result<Self, QueryError> {
        let object = value.as_object().ok_or_else(|| QueryError::MalformedFilter {
            message: "filter must be a JSON object".to_string(),
        })?;

        let mut set = FilterSet::new();
        for (key, value) in object {
            let (field, op) = FilterOp::split_key(key);
            if field.is_empty() {
                return Err(QueryError::MalformedFilter {
                    message: format!("filter key '{}' has no field name", key),
                });
            }
            let op = match (op, value) {
                (FilterOp::Eq, Value::Array(_)) => FilterOp::In,
                (op, _) => op,
            };
            set.push(field.to_string(), op, value.clone());
        }
        Ok(set)
    }

    /// Render back to the wire JSON object
    pub fn to_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        for (field, predicate) in self.iter() {
            object.insert(
                format!("{}{}", field, predicate.op.suffix()),
                predicate.value.clone(),
            );
        }
        Value::Object(object)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc", alias = "ascending")]
    Ascending,
    #[serde(rename = "desc", alias = "descending")]
    Descending,
}

impl SortDirection {
    pub fn parse(field: &str, s: &str) -> Result<Self, QueryError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(QueryError::InvalidSortDirection {
                field: field.to_string(),
                direction: s.to_string(),
            }),
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("asc"),
            SortDirection::Descending => f.write_str("desc"),
        }
    }
}

/// One entry of a sort specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parse `field`, `field:asc` or `field:desc`
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        let (field, direction) = match s.split_once(':') {
            Some((field, dir)) => (field.trim(), SortDirection::parse(field.trim(), dir)?),
            None => (s.trim(), SortDirection::Ascending),
        };
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }

    /// Parse a comma-separated list of sort keys
    pub fn parse_list(s: &str) -> Result<Vec<Self>, QueryError> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect()
    }
}

/// Compare two rows by an ordered list of sort keys
///
/// The first key has the highest priority. Returns `Equal` when all keys tie.
pub fn compare_rows(a: &Row, b: &Row, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let left = FieldValue::from_json(a.get(&key.field).unwrap_or(&Value::Null));
        let right = FieldValue::from_json(b.get(&key.field).unwrap_or(&Value::Null));
        let ord = key.direction.apply(left.sort_cmp(&right));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,
}

impl Pagination {
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Number of rows to skip
    ///
    /// Saturates at `usize::MAX`, which lands past the end of any table.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Combination of filter, sort and pagination for one read request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    #[serde(default)]
    filters: FilterSet,
    #[serde(default)]
    sort: Vec<SortKey>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

impl QueryDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Add one predicate
    pub fn filter(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(field.into(), op, value.into());
        self
    }

    /// Append a sort key (lower priority than the ones already present)
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(SortKey {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: usize, limit: usize) -> Self {
        self.pagination = Some(Pagination::new(page, limit));
        self
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    /// Check this descriptor against an entity schema
    ///
    /// Pure and idempotent: the same descriptor and schema always give the
    /// same answer.
    pub fn validate(&self, schema: &EntitySchema) -> Result<(), QueryError> {
        validate(self, schema)
    }

    /// Render as URL query pairs (inverse of [`QueryParams::into_descriptor`])
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(p) = self.pagination {
            pairs.push(("page".to_string(), p.page.to_string()));
            pairs.push(("limit".to_string(), p.limit.to_string()));
        }
        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(|k| format!("{}:{}", k.field, k.direction))
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("sort".to_string(), sort));
        }
        if !self.filters.is_empty() {
            pairs.push(("filter".to_string(), self.filters.to_json().to_string()));
        }
        pairs
    }
}

/// Validate a descriptor against an entity schema
///
/// Fails with `UnknownField` for filter or sort fields the entity does not
/// declare, `InvalidPage` for page 0 and `InvalidPageSize` for a limit of 0
/// or above the entity maximum.
pub fn validate(descriptor: &QueryDescriptor, schema: &EntitySchema) -> Result<(), QueryError> {
    let referenced = descriptor
        .filters
        .fields()
        .chain(descriptor.sort.iter().map(|k| k.field.as_str()));

    for field in referenced {
        if !schema.has_field(field) {
            return Err(QueryError::UnknownField {
                entity: schema.name.clone(),
                field: field.to_string(),
            });
        }
    }

    if let Some(p) = descriptor.pagination {
        if p.page == 0 {
            return Err(QueryError::InvalidPage { page: p.page });
        }
        let max = schema.pagination.max_limit;
        if p.limit == 0 || p.limit > max {
            return Err(QueryError::InvalidPageSize {
                limit: p.limit,
                max,
            });
        }
    }

    Ok(())
}

/// Query parameters for pagination and filtering, as read from a URL
///
/// Built from the raw query map so entity-specific filter aliases
/// (`categoryId`, `seasonId`, ...) can sit next to the generic keys.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    /// Page number (starts at 1)
    pub page: Option<usize>,

    /// Number of items per page
    pub limit: Option<usize>,

    /// Filters as JSON object
    pub filter: Option<String>,

    /// Sort list, `field:dir,field:dir`
    pub sort: Option<String>,

    /// Remaining parameters, matched against the entity's filter aliases
    pub extra: HashMap<String, String>,
}

impl QueryParams {
    /// Split a raw query map into generic keys and alias candidates
    pub fn from_map(mut raw: HashMap<String, String>) -> Result<Self, QueryError> {
        let page = raw
            .remove("page")
            .map(|v| parse_number("page", &v))
            .transpose()?;
        let limit = raw
            .remove("limit")
            .map(|v| parse_number("limit", &v))
            .transpose()?;

        Ok(Self {
            page,
            limit,
            filter: raw.remove("filter"),
            sort: raw.remove("sort"),
            extra: raw,
        })
    }

    /// Parse filter JSON string into Value
    pub fn filter_value(&self) -> Result<Option<Value>, QueryError> {
        self.filter
            .as_deref()
            .map(|s| {
                serde_json::from_str(s).map_err(|e| QueryError::MalformedFilter {
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Build and validate a descriptor for `schema`
    ///
    /// A parameter that is neither a generic key nor one of the entity's
    /// filter aliases is `UnknownField`. Without `sort` the entity's default
    /// sort applies. Pagination only applies when `page` or `limit` is given;
    /// a missing one takes the entity default.
    pub fn into_descriptor(self, schema: &EntitySchema) -> Result<QueryDescriptor, QueryError> {
        let mut filters = match self.filter_value()? {
            Some(value) => FilterSet::from_json(&value)?,
            None => FilterSet::new(),
        };

        if let Some(unknown) = self
            .extra
            .keys()
            .filter(|param| !schema.filter_aliases.iter().any(|a| &a.param == *param))
            .min()
        {
            return Err(QueryError::UnknownField {
                entity: schema.name.clone(),
                field: unknown.clone(),
            });
        }

        for alias in &schema.filter_aliases {
            if let Some(value) = self.extra.get(&alias.param) {
                filters.push(alias.column.clone(), FilterOp::Eq, Value::String(value.clone()));
            }
        }

        let sort = match self.sort.as_deref() {
            Some(s) if !s.trim().is_empty() => SortKey::parse_list(s)?,
            _ => schema.default_sort.clone(),
        };

        let pagination = match (self.page, self.limit) {
            (None, None) => None,
            (page, limit) => Some(Pagination::new(
                page.unwrap_or(1),
                limit.unwrap_or(schema.pagination.default_limit),
            )),
        };

        let descriptor = QueryDescriptor {
            filters,
            sort,
            pagination,
        };
        descriptor.validate(schema)?;
        Ok(descriptor)
    }
}

fn parse_number(name: &str, value: &str) -> Result<usize, QueryError> {
    value
        .trim()
        .parse()
        .map_err(|_| QueryError::MalformedParameter {
            name: name.to_string(),
            value: value.to_string(),
        })
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = Pagination::new(page, limit).offset();

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::EntitySchema;
    use serde_json::json;

    fn committees() -> EntitySchema {
        EntitySchema::new("committees", "committee")
            .fields(["id", "name", "sort_order", "is_active"])
            .default_sort(vec![SortKey::asc("sort_order")])
            .filter_alias("active", "is_active")
    }

    fn row(value: Value) -> Row {
        value.as_object().cloned().expect("object")
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        let raw = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryParams::from_map(raw).expect("params parse")
    }

    #[test]
    fn test_split_key() {
        assert_eq!(FilterOp::split_key("amount>="), ("amount", FilterOp::Gte));
        assert_eq!(FilterOp::split_key("amount>"), ("amount", FilterOp::Gt));
        assert_eq!(FilterOp::split_key("name~"), ("name", FilterOp::Like));
        assert_eq!(FilterOp::split_key("status!="), ("status", FilterOp::Neq));
        assert_eq!(FilterOp::split_key("status"), ("status", FilterOp::Eq));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let set = FilterSet::new();
        assert!(set.matches(&row(json!({"name": "Board"}))));
        assert!(set.matches(&Row::new()));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let set = FilterSet::new()
            .and("is_active", FilterOp::Eq, true)
            .and("sort_order", FilterOp::Lt, 5);

        assert!(set.matches(&row(json!({"is_active": true, "sort_order": 2}))));
        assert!(!set.matches(&row(json!({"is_active": true, "sort_order": 9}))));
        assert!(!set.matches(&row(json!({"is_active": false, "sort_order": 2}))));
    }

    #[test]
    fn test_string_alias_value_matches_numeric_column() {
        let predicate = Predicate {
            op: FilterOp::Eq,
            value: json!("42"),
        };
        assert!(predicate.matches(Some(&json!(42))));
        assert!(!predicate.matches(Some(&json!(41))));
    }

    #[test]
    fn test_in_and_like() {
        let set = FilterSet::from_json(&json!({"id": [1, 3], "name~": "%board%"})).expect("parse");
        assert!(set.matches(&row(json!({"id": 3, "name": "Youth Board"}))));
        assert!(!set.matches(&row(json!({"id": 2, "name": "Youth Board"}))));
        assert!(!set.matches(&row(json!({"id": 1, "name": "Finance"}))));
    }

    #[test]
    fn test_missing_field_never_satisfies_comparison() {
        let predicate = Predicate {
            op: FilterOp::Gt,
            value: json!(0),
        };
        assert!(!predicate.matches(None));
    }

    #[test]
    fn test_filter_json_round_trip() {
        let set = FilterSet::new()
            .and("month", FilterOp::Gte, 3)
            .and("name", FilterOp::Like, "region");
        let parsed = FilterSet::from_json(&set.to_json()).expect("parse");
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("name").expect("parse"), SortKey::asc("name"));
        assert_eq!(
            SortKey::parse("start_date:desc").expect("parse"),
            SortKey::desc("start_date")
        );
        assert!(matches!(
            SortKey::parse("name:sideways"),
            Err(QueryError::InvalidSortDirection { .. })
        ));
    }

    #[test]
    fn test_compare_rows_tie_break_priority() {
        let keys = vec![SortKey::desc("month"), SortKey::asc("name")];
        let a = row(json!({"month": 5, "name": "Beta"}));
        let b = row(json!({"month": 5, "name": "Alpha"}));
        let c = row(json!({"month": 7, "name": "Zeta"}));

        assert_eq!(compare_rows(&c, &a, &keys), Ordering::Less);
        assert_eq!(compare_rows(&b, &a, &keys), Ordering::Less);
        assert_eq!(compare_rows(&a, &a, &keys), Ordering::Equal);
    }

    #[test]
    fn test_validate_unknown_filter_field() {
        let descriptor = QueryDescriptor::new().filter("colour", FilterOp::Eq, "red");
        assert_eq!(
            descriptor.validate(&committees()),
            Err(QueryError::UnknownField {
                entity: "committees".to_string(),
                field: "colour".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_unknown_sort_field() {
        let descriptor = QueryDescriptor::new().sort_by("colour", SortDirection::Ascending);
        assert!(matches!(
            descriptor.validate(&committees()),
            Err(QueryError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_validate_page_size_bounds() {
        let schema = committees();
        assert!(QueryDescriptor::new().paginate(1, 100).validate(&schema).is_ok());
        assert_eq!(
            QueryDescriptor::new().paginate(1, 101).validate(&schema),
            Err(QueryError::InvalidPageSize { limit: 101, max: 100 })
        );
        assert!(matches!(
            QueryDescriptor::new().paginate(1, 0).validate(&schema),
            Err(QueryError::InvalidPageSize { .. })
        ));
        assert_eq!(
            QueryDescriptor::new().paginate(0, 10).validate(&schema),
            Err(QueryError::InvalidPage { page: 0 })
        );
    }

    #[test]
    fn test_validate_is_idempotent() {
        let schema = committees();
        let good = QueryDescriptor::new()
            .filter("name", FilterOp::Like, "board")
            .paginate(2, 10);
        let bad = QueryDescriptor::new().filter("nope", FilterOp::Eq, 1);

        assert_eq!(good.validate(&schema), good.validate(&schema));
        assert_eq!(bad.validate(&schema), bad.validate(&schema));
    }

    #[test]
    fn test_params_default_sort_and_no_pagination() {
        let descriptor = params(&[]).into_descriptor(&committees()).expect("valid");
        assert_eq!(descriptor.sort(), &[SortKey::asc("sort_order")]);
        assert!(descriptor.pagination().is_none());
        assert!(descriptor.filters().is_empty());
    }

    #[test]
    fn test_params_limit_only_defaults_page() {
        let descriptor = params(&[("limit", "10")])
            .into_descriptor(&committees())
            .expect("valid");
        assert_eq!(descriptor.pagination(), Some(Pagination::new(1, 10)));
    }

    #[test]
    fn test_params_page_only_uses_default_limit() {
        let descriptor = params(&[("page", "3")])
            .into_descriptor(&committees())
            .expect("valid");
        assert_eq!(descriptor.pagination(), Some(Pagination::new(3, 25)));
    }

    #[test]
    fn test_params_alias_becomes_predicate() {
        let descriptor = params(&[("active", "true")])
            .into_descriptor(&committees())
            .expect("valid");
        let fields: Vec<_> = descriptor.filters().fields().collect();
        assert_eq!(fields, vec!["is_active"]);
    }

    #[test]
    fn test_params_unmatched_parameter_is_unknown_field() {
        let result = params(&[("is_active", "true")]).into_descriptor(&committees());
        assert_eq!(
            result,
            Err(QueryError::UnknownField {
                entity: "committees".into(),
                field: "is_active".into(),
            })
        );
    }

    #[test]
    fn test_huge_page_lands_past_the_end() {
        let pagination = Pagination::new(usize::MAX, 10);
        assert_eq!(pagination.offset(), usize::MAX);

        let meta = PaginationMeta::new(usize::MAX, 10, 25);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
        assert_eq!(meta.total_pages, 3);

        let meta = PaginationMeta::new(2, usize::MAX, 25);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_params_malformed_numbers() {
        let raw = [("page".to_string(), "two".to_string())].into_iter().collect();
        assert!(matches!(
            QueryParams::from_map(raw),
            Err(QueryError::MalformedParameter { .. })
        ));
    }

    #[test]
    fn test_params_malformed_filter() {
        let result = params(&[("filter", "[1,2]")]).into_descriptor(&committees());
        assert!(matches!(result, Err(QueryError::MalformedFilter { .. })));

        let result = params(&[("filter", "{not json")]).into_descriptor(&committees());
        assert!(matches!(result, Err(QueryError::MalformedFilter { .. })));
    }

    #[test]
    fn test_query_pairs_parse_back() {
        let schema = committees();
        let descriptor = QueryDescriptor::new()
            .filter("name", FilterOp::Like, "board")
            .sort_by("sort_order", SortDirection::Descending)
            .sort_by("id", SortDirection::Ascending)
            .paginate(2, 10);

        let raw = descriptor.to_query_pairs().into_iter().collect();
        let parsed = QueryParams::from_map(raw)
            .expect("params")
            .into_descriptor(&schema)
            .expect("valid");
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(1, 20, 145);
        assert_eq!(meta.total, 145);
        assert_eq!(meta.total_pages, 8);
        assert!(!meta.has_prev);
        assert!(meta.has_next);

        let last = PaginationMeta::new(3, 10, 25);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }
}
