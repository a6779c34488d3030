//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::EntityRegistry;
use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::AppConfig;
use crate::core::auth::{AuthProvider, NoAuthProvider};
use crate::core::entity::Entity;
use crate::core::schema::EntitySchema;
use crate::core::store::DataStore;
use crate::entities::catalog::builtin_schemas;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating HTTP servers serving the entity routes
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_auth_provider(config.token_provider())
///     .with_builtin_entities()
///     .with_config(config)
///     .build()?;
/// ```
pub struct ServerBuilder {
    auth: Option<Arc<dyn AuthProvider>>,
    store: Option<Arc<dyn DataStore>>,
    entity_registry: EntityRegistry,
    configs: Vec<AppConfig>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            auth: None,
            store: None,
            entity_registry: EntityRegistry::new(),
            configs: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the data store (required)
    pub fn with_store(mut self, store: impl DataStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set a shared data store (required)
    pub fn with_shared_store(mut self, store: Arc<dyn DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the identity provider; without one every caller is anonymous
    pub fn with_auth_provider(mut self, auth: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    /// Register the built-in club entities
    pub fn with_builtin_entities(mut self) -> Self {
        for schema in builtin_schemas() {
            self.entity_registry.register(schema);
        }
        self
    }

    /// Register an entity type with its built-in schema
    pub fn register_entity<T: Entity>(mut self) -> Self {
        self.entity_registry.register_entity::<T>();
        self
    }

    /// Register a hand-built schema
    pub fn register_schema(mut self, schema: EntitySchema) -> Self {
        self.entity_registry.register(schema);
        self
    }

    /// Add a configuration layer; later layers win
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Configuration overrides are applied to the registered entities here.
    pub fn build_host(mut self) -> Result<ServerHost> {
        let config = AppConfig::merge(std::mem::take(&mut self.configs));
        self.entity_registry.apply_overrides(&config.entities)?;

        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow::anyhow!("DataStore is required. Call .with_store()"))?;
        let auth = self
            .auth
            .take()
            .unwrap_or_else(|| Arc::new(NoAuthProvider));

        tracing::debug!(
            entities = ?self.entity_registry.entity_types(),
            "entity registry ready"
        );
        Ok(ServerHost::new(auth, store, self.entity_registry))
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        Ok(RestExposure::build_router(host, custom_routes))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
