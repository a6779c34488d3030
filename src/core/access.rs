//! Entity access functions
//!
//! Each operation is a thin composition: gate on the schema's policy, check
//! the request, perform one store interaction, shape the result. The free
//! functions work on raw rows for any schema; [`EntityAccess`] instantiates
//! them for a concrete [`Entity`] type.

use crate::core::entity::Entity;
use crate::core::envelope::Envelope;
use crate::core::error::AccessError;
use crate::core::gate::{Gate, RequestContext, StoreHandle};
use crate::core::query::{PaginationMeta, QueryDescriptor, QueryParams};
use crate::core::schema::EntitySchema;
use crate::core::store::Row;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Fields a caller may never overwrite on update
const PROTECTED_ON_UPDATE: [&str; 2] = ["id", "created_at"];

/// Result rows of a list call
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub rows: Vec<T>,

    /// Present when the request was paginated
    pub meta: Option<PaginationMeta>,
}

impl<T> Listing<T> {
    pub fn into_envelope(self) -> Envelope<Vec<T>> {
        match self.meta {
            Some(meta) => Envelope::paginated(self.rows, meta),
            None => Envelope::success(self.rows),
        }
    }
}

/// Body of a successful delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct Deleted {
    pub success: bool,
}

/// List rows of `schema` matching an already-built descriptor
pub async fn list(
    gate: &Gate,
    ctx: &RequestContext,
    schema: &EntitySchema,
    descriptor: &QueryDescriptor,
) -> Result<Listing<Row>, AccessError> {
    gate.run(ctx, schema.read, |_, store| async move {
        descriptor.validate(schema)?;
        query_page(&store, schema, descriptor).await
    })
    .await
}

/// List rows of `schema` from raw URL parameters
///
/// Parameters are parsed behind the gate, so malformed input from an
/// unauthenticated caller still answers 401.
pub async fn list_params(
    gate: &Gate,
    ctx: &RequestContext,
    schema: &EntitySchema,
    raw: HashMap<String, String>,
) -> Result<Listing<Row>, AccessError> {
    gate.run(ctx, schema.read, |_, store| async move {
        let descriptor = QueryParams::from_map(raw)?.into_descriptor(schema)?;
        query_page(&store, schema, &descriptor).await
    })
    .await
}

async fn query_page(
    store: &StoreHandle,
    schema: &EntitySchema,
    descriptor: &QueryDescriptor,
) -> Result<Listing<Row>, AccessError> {
    let page = store.query(&schema.name, descriptor).await?;
    let meta = descriptor
        .pagination()
        .map(|p| PaginationMeta::new(p.page, p.limit, page.total));
    Ok(Listing {
        rows: page.rows,
        meta,
    })
}

/// Fetch one row by id
pub async fn get(
    gate: &Gate,
    ctx: &RequestContext,
    schema: &EntitySchema,
    id: &str,
) -> Result<Row, AccessError> {
    gate.run(ctx, schema.item_read_policy(), |_, store| async move {
        store
            .fetch(&schema.name, id)
            .await?
            .ok_or_else(|| not_found(schema, id))
    })
    .await
}

/// Insert a new row
pub async fn create(
    gate: &Gate,
    ctx: &RequestContext,
    schema: &EntitySchema,
    body: Value,
) -> Result<Row, AccessError> {
    gate.run(ctx, schema.write_policy(), |_, store| async move {
        ensure_writable(schema, "create")?;
        let row = into_row(body)?;
        schema
            .validation
            .validate_create(&row)
            .map_err(AccessError::invalid_body)?;
        Ok(store.insert(&schema.name, row).await?)
    })
    .await
}

/// Merge a partial body into an existing row
pub async fn update(
    gate: &Gate,
    ctx: &RequestContext,
    schema: &EntitySchema,
    id: &str,
    body: Value,
) -> Result<Row, AccessError> {
    gate.run(ctx, schema.write_policy(), |_, store| async move {
        ensure_writable(schema, "update")?;
        let row = into_row(body)?;
        schema
            .validation
            .validate_update(&row)
            .map_err(AccessError::invalid_body)?;
        store
            .update(&schema.name, id, prepare_update(row))
            .await?
            .ok_or_else(|| not_found(schema, id))
    })
    .await
}

/// Remove a row
pub async fn delete(
    gate: &Gate,
    ctx: &RequestContext,
    schema: &EntitySchema,
    id: &str,
) -> Result<Deleted, AccessError> {
    gate.run(ctx, schema.write_policy(), |_, store| async move {
        ensure_writable(schema, "delete")?;
        if store.delete(&schema.name, id).await? {
            Ok(Deleted { success: true })
        } else {
            Err(not_found(schema, id))
        }
    })
    .await
}

/// Strip protected fields and stamp `updated_at`
pub fn prepare_update(mut row: Row) -> Row {
    for field in PROTECTED_ON_UPDATE {
        row.remove(field);
    }
    row.insert(
        "updated_at".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    row
}

fn ensure_writable(schema: &EntitySchema, operation: &str) -> Result<(), AccessError> {
    if schema.is_writable() {
        Ok(())
    } else {
        Err(AccessError::MethodNotAllowed {
            entity: schema.name.clone(),
            operation: operation.to_string(),
        })
    }
}

fn into_row(body: Value) -> Result<Row, AccessError> {
    match body {
        Value::Object(row) => Ok(row),
        _ => Err(AccessError::ValidationFailed {
            message: "Request body must be a JSON object".to_string(),
            violations: Vec::new(),
        }),
    }
}

fn not_found(schema: &EntitySchema, id: &str) -> AccessError {
    AccessError::NotFound {
        entity: schema.singular.clone(),
        id: id.to_string(),
    }
}

fn decode<T: DeserializeOwned>(row: Row) -> Result<T, AccessError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Access functions instantiated for one entity type
pub struct EntityAccess<T> {
    gate: Gate,
    schema: Arc<EntitySchema>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityAccess<T> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            schema: self.schema.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> EntityAccess<T> {
    /// Use the entity's built-in schema
    pub fn new(gate: Gate) -> Self {
        Self::with_schema(gate, Arc::new(T::schema()))
    }

    /// Use a schema with configuration overrides applied
    pub fn with_schema(gate: Gate, schema: Arc<EntitySchema>) -> Self {
        Self {
            gate,
            schema,
            _entity: PhantomData,
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        descriptor: &QueryDescriptor,
    ) -> Result<Listing<T>, AccessError> {
        let listing = list(&self.gate, ctx, &self.schema, descriptor).await?;
        Ok(Listing {
            rows: listing
                .rows
                .into_iter()
                .map(decode)
                .collect::<Result<_, _>>()?,
            meta: listing.meta,
        })
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<T, AccessError> {
        decode(get(&self.gate, ctx, &self.schema, id).await?)
    }

    pub async fn create<B: Serialize>(
        &self,
        ctx: &RequestContext,
        body: &B,
    ) -> Result<T, AccessError> {
        let body = serde_json::to_value(body)?;
        decode(create(&self.gate, ctx, &self.schema, body).await?)
    }

    pub async fn update<B: Serialize>(
        &self,
        ctx: &RequestContext,
        id: &str,
        patch: &B,
    ) -> Result<T, AccessError> {
        let patch = serde_json::to_value(patch)?;
        decode(update(&self.gate, ctx, &self.schema, id, patch).await?)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<Deleted, AccessError> {
        delete(&self.gate, ctx, &self.schema, id).await
    }
}
