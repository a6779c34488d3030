//! Router builder utilities for entity routes

use crate::core::access;
use crate::core::envelope::HandlerResult;
use crate::core::extractors::EntityBody;
use crate::core::gate::RequestContext;
use crate::server::host::ServerHost;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;

/// Build entity routes
///
/// These routes are generic and work for all registered entities:
/// - GET /api/entities/{entity} - List with `page`, `limit`, `sort`, `filter` and aliases
/// - POST /api/entities/{entity} - Create
/// - GET /api/entities/{entity}/{id} - Get one
/// - PUT|PATCH /api/entities/{entity}/{id} - Update
/// - DELETE /api/entities/{entity}/{id} - Delete
pub fn build_entity_routes(host: Arc<ServerHost>) -> Router {
    Router::new()
        .route(
            "/api/entities/{entity}",
            get(list_entities).post(create_entity),
        )
        .route(
            "/api/entities/{entity}/{id}",
            get(get_entity)
                .put(update_entity)
                .patch(update_entity)
                .delete(delete_entity),
        )
        .with_state(host)
}

async fn list_entities(
    State(host): State<Arc<ServerHost>>,
    Path(entity): Path<String>,
    Query(raw): Query<HashMap<String, String>>,
    ctx: RequestContext,
) -> Response {
    let schema = match host.schema(&entity) {
        Ok(schema) => schema,
        Err(err) => return err.into_response(),
    };
    match access::list_params(&host.gate, &ctx, &schema, raw).await {
        Ok(listing) => HandlerResult::ok(listing.into_envelope()).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn get_entity(
    State(host): State<Arc<ServerHost>>,
    Path((entity, id)): Path<(String, String)>,
    ctx: RequestContext,
) -> Response {
    let schema = match host.schema(&entity) {
        Ok(schema) => schema,
        Err(err) => return err.into_response(),
    };
    HandlerResult::from(access::get(&host.gate, &ctx, &schema, &id).await).into_response()
}

async fn create_entity(
    State(host): State<Arc<ServerHost>>,
    Path(entity): Path<String>,
    ctx: RequestContext,
    EntityBody(body): EntityBody,
) -> Response {
    let schema = match host.schema(&entity) {
        Ok(schema) => schema,
        Err(err) => return err.into_response(),
    };
    HandlerResult::from(access::create(&host.gate, &ctx, &schema, body).await)
        .with_success_status(StatusCode::CREATED)
        .into_response()
}

async fn update_entity(
    State(host): State<Arc<ServerHost>>,
    Path((entity, id)): Path<(String, String)>,
    ctx: RequestContext,
    EntityBody(body): EntityBody,
) -> Response {
    let schema = match host.schema(&entity) {
        Ok(schema) => schema,
        Err(err) => return err.into_response(),
    };
    HandlerResult::from(access::update(&host.gate, &ctx, &schema, &id, body).await).into_response()
}

async fn delete_entity(
    State(host): State<Arc<ServerHost>>,
    Path((entity, id)): Path<(String, String)>,
    ctx: RequestContext,
) -> Response {
    let schema = match host.schema(&entity) {
        Ok(schema) => schema,
        Err(err) => return err.into_response(),
    };
    HandlerResult::from(access::delete(&host.gate, &ctx, &schema, &id).await).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::{CallerIdentity, TokenAuthProvider};
    use crate::server::entity_registry::EntityRegistry;
    use crate::storage::InMemoryStore;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn router() -> Router {
        let auth = TokenAuthProvider::new()
            .with_token("coach", CallerIdentity::authenticated("c-1"))
            .with_token("treasurer", CallerIdentity::admin("t-1"));
        let host = ServerHost::new(
            Arc::new(auth),
            Arc::new(InMemoryStore::new()),
            EntityRegistry::builtin(),
        );
        build_entity_routes(Arc::new(host))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_answers_created() {
        let request = Request::post("/api/entities/clubs")
            .header(header::AUTHORIZATION, "Bearer treasurer")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"name": "FC Example"}).to_string()))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["data"]["name"], "FC Example");
        assert!(body["error"].is_null());
    }

    #[tokio::test]
    async fn test_member_create_is_forbidden() {
        let request = Request::post("/api/entities/clubs")
            .header(header::AUTHORIZATION, "Bearer coach")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"name": "FC Example"}).to_string()))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_json(response).await["data"].is_null());
    }

    #[tokio::test]
    async fn test_unknown_entity_answers_before_the_gate() {
        let request = Request::get("/api/entities/dragons").body(Body::empty()).unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Entity 'dragons' not found");
    }
}
