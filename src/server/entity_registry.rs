//! Entity registry: the schemas served on the dynamic entity routes

use crate::config::EntityOverride;
use crate::core::entity::Entity;
use crate::core::schema::EntitySchema;
use crate::entities::catalog::builtin_schemas;
use anyhow::Result;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry for all entities in the application
///
/// Keyed by endpoint name. Registering a name twice replaces the earlier
/// schema.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    schemas: IndexMap<String, Arc<EntitySchema>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in club entities
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for schema in builtin_schemas() {
            registry.register(schema);
        }
        registry
    }

    /// Register a schema
    pub fn register(&mut self, schema: EntitySchema) {
        self.schemas.insert(schema.name.clone(), Arc::new(schema));
    }

    /// Register an entity type with its built-in schema
    pub fn register_entity<T: Entity>(&mut self) {
        self.register(T::schema());
    }

    pub fn get(&self, name: &str) -> Option<Arc<EntitySchema>> {
        self.schemas.get(name).cloned()
    }

    /// Get all registered entity names, in registration order
    pub fn entity_types(&self) -> Vec<&str> {
        self.schemas.keys().map(|s| s.as_str()).collect()
    }

    /// Apply configuration overrides
    ///
    /// An override naming an unregistered entity is an error.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, EntityOverride>) -> Result<()> {
        for (name, entity_override) in overrides {
            let Some(current) = self.schemas.get(name) else {
                anyhow::bail!("configuration overrides unknown entity '{}'", name);
            };
            let updated = entity_override.apply(current.as_ref().clone())?;
            self.schemas.insert(name.clone(), Arc::new(updated));
        }
        Ok(())
    }
}
