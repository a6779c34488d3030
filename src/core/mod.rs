//! Core module containing the access layer: queries, the gate, envelopes and
//! the generic entity operations

pub mod access;
pub mod auth;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod field;
pub mod gate;
pub mod query;
pub mod schema;
pub mod store;
pub mod validation;

pub use access::{Deleted, EntityAccess, Listing};
pub use auth::{AccessPolicy, AuthProvider, CallerIdentity, NoAuthProvider, Role, TokenAuthProvider};
pub use entity::Entity;
pub use envelope::{Envelope, HandlerResult};
pub use error::{AccessError, QueryError, StoreError};
pub use extractors::EntityBody;
pub use field::FieldValue;
pub use gate::{Gate, RequestContext, StoreHandle};
pub use query::{
    FilterOp, FilterSet, Pagination, PaginationMeta, QueryDescriptor, QueryParams, SortDirection,
    SortKey,
};
pub use schema::{EntitySchema, FilterAlias, PaginationDefaults};
pub use store::{DataStore, Page, QueryableStore, Row};
