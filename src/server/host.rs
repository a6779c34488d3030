//! Server host for transport-agnostic API exposure
//!
//! The host holds everything a transport needs to serve entity operations:
//! the gate (identity provider plus store) and the schema registry.

use crate::core::auth::AuthProvider;
use crate::core::error::AccessError;
use crate::core::gate::Gate;
use crate::core::schema::EntitySchema;
use crate::core::store::DataStore;
use crate::server::entity_registry::EntityRegistry;
use std::sync::Arc;

/// Host context containing all framework state
#[derive(Clone)]
pub struct ServerHost {
    pub gate: Gate,
    pub registry: Arc<EntityRegistry>,
}

impl ServerHost {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DataStore>,
        registry: EntityRegistry,
    ) -> Self {
        Self {
            gate: Gate::new(auth, store),
            registry: Arc::new(registry),
        }
    }

    /// Schema for an endpoint name, `UnknownEntity` when unregistered
    pub fn schema(&self, entity: &str) -> Result<Arc<EntitySchema>, AccessError> {
        self.registry
            .get(entity)
            .ok_or_else(|| AccessError::UnknownEntity {
                entity: entity.to_string(),
            })
    }

    /// Get entity types registered in the host
    pub fn entity_types(&self) -> Vec<&str> {
        self.registry.entity_types()
    }
}
