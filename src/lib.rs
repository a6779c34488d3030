//! # Clubhouse
//!
//! Generic entity data-access layer for a club-management application.
//!
//! ## Features
//!
//! - **Query descriptors**: filter, sort and paginate any entity with one type
//! - **Authorization gate**: every read and write is checked before the store is touched
//! - **Response envelope**: `{data, error}` with exactly one side set
//! - **Generic access functions**: one implementation for every entity type
//! - **Fetch units**: client-side state machine with latest-request-wins commits
//! - **Configuration-based**: access policies, default sorts and pagination via YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clubhouse::prelude::*;
//!
//! let auth = TokenAuthProvider::new().with_token("s3cret", CallerIdentity::admin("treasurer"));
//! let app = ServerBuilder::new()
//!     .with_store(InMemoryStore::new())
//!     .with_auth_provider(auth)
//!     .with_builtin_entities()
//!     .build()?;
//!
//! // GET /api/entities/committees?page=1&limit=10&sort=sort_order:asc
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        access::{Deleted, EntityAccess, Listing},
        auth::{
            AccessPolicy, AuthProvider, CallerIdentity, NoAuthProvider, Role, TokenAuthProvider,
        },
        entity::Entity,
        envelope::{Envelope, HandlerResult},
        error::{AccessError, QueryError, StoreError},
        gate::{Gate, RequestContext},
        query::{
            FilterOp, FilterSet, PaginationMeta, QueryDescriptor, QueryParams, SortDirection,
            SortKey,
        },
        schema::EntitySchema,
        store::{DataStore, Page, Row},
        validation::{EntityValidationConfig, validators},
    };

    // === Macros ===
    pub use crate::define_entity;

    // === Entities ===
    pub use crate::entities::catalog::*;

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryStore;

    // === Config ===
    pub use crate::config::{AppConfig, EntityOverride};

    // === Server ===
    pub use crate::server::{EntityRegistry, ServerBuilder, ServerHost};

    // === Client ===
    pub use crate::client::{
        Endpoint, FetchError, FetchPhase, FetchState, FetchUnit, FetcherConfig, HttpTransport,
        Transport, create_fetcher,
    };

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
