//! Server module for building HTTP servers
//!
//! The `ServerBuilder` registers the generic entity routes for every schema
//! in the registry, plus health checks and custom routes.

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use entity_registry::EntityRegistry;
pub use exposure::RestExposure;
pub use host::ServerHost;
