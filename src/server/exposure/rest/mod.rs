//! REST exposure: health probes, the entity routes and any custom routes,
//! behind request tracing and permissive CORS

use crate::server::host::ServerHost;
use crate::server::router::build_entity_routes;
use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub struct RestExposure;

impl RestExposure {
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Router {
        let probes = Router::new()
            .route("/health", get(health))
            .route("/healthz", get(health))
            .with_state(host.clone());

        custom_routes
            .into_iter()
            .fold(probes.merge(build_entity_routes(host)), |app, routes| app.merge(routes))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }
}

/// Liveness plus the entity names served
async fn health(State(host): State<Arc<ServerHost>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "clubhouse",
        "entities": host.entity_types(),
    }))
}
