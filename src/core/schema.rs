//! Entity schemas
//!
//! A schema is everything the access layer needs to know about an entity
//! besides its Rust type: endpoint name, declared fields, access policies,
//! default ordering, pagination bounds and URL filter aliases.

use crate::core::auth::AccessPolicy;
use crate::core::query::SortKey;
use crate::core::validation::EntityValidationConfig;
use serde::{Deserialize, Serialize};

/// Default and maximum page size for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationDefaults {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            default_limit: 25,
            max_limit: 100,
        }
    }
}

/// Maps a URL parameter onto a store column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterAlias {
    /// Query-string parameter name (e.g. `categoryId`)
    pub param: String,

    /// Column filtered on (e.g. `category_id`)
    pub column: String,
}

/// Description of one entity
#[derive(Debug, Clone)]
pub struct EntitySchema {
    /// Plural endpoint/table name (e.g. "committees")
    pub name: String,

    /// Singular name used in messages (e.g. "committee")
    pub singular: String,

    /// Fields that may be filtered and sorted on
    pub fields: Vec<String>,

    /// Policy for listing; fetching one row never goes below `Authenticated`
    pub read: AccessPolicy,

    /// Policy for create/update/delete; `None` marks a read-only entity
    pub write: Option<AccessPolicy>,

    /// Sort used when the caller gives none
    pub default_sort: Vec<SortKey>,

    pub pagination: PaginationDefaults,

    pub filter_aliases: Vec<FilterAlias>,

    /// Body validation applied on create and update
    pub validation: EntityValidationConfig,
}

impl EntitySchema {
    /// A schema readable by authenticated callers and writable by admins
    pub fn new(name: impl Into<String>, singular: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            singular: singular.into(),
            fields: Vec::new(),
            read: AccessPolicy::Authenticated,
            write: Some(AccessPolicy::Admin),
            default_sort: Vec::new(),
            pagination: PaginationDefaults::default(),
            filter_aliases: Vec::new(),
            validation: EntityValidationConfig::new(),
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn read(mut self, policy: AccessPolicy) -> Self {
        self.read = policy;
        self
    }

    pub fn write(mut self, policy: AccessPolicy) -> Self {
        self.write = Some(policy);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.write = None;
        self
    }

    pub fn default_sort(mut self, sort: Vec<SortKey>) -> Self {
        self.default_sort = sort;
        self
    }

    pub fn pagination(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.pagination = PaginationDefaults {
            default_limit,
            max_limit,
        };
        self
    }

    pub fn filter_alias(mut self, param: impl Into<String>, column: impl Into<String>) -> Self {
        self.filter_aliases.push(FilterAlias {
            param: param.into(),
            column: column.into(),
        });
        self
    }

    pub fn validation(mut self, validation: EntityValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// Policy for fetching a single row by id
    ///
    /// A public listing still needs a signed-in caller to open one row.
    pub fn item_read_policy(&self) -> AccessPolicy {
        match self.read {
            AccessPolicy::Public => AccessPolicy::Authenticated,
            policy => policy,
        }
    }

    /// Policy gating create, update and delete
    ///
    /// Read-only entities keep the admin gate, so only admins learn that the
    /// method is unsupported.
    pub fn write_policy(&self) -> AccessPolicy {
        self.write.unwrap_or(AccessPolicy::Admin)
    }
}
