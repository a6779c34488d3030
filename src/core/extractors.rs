//! Axum extractors for entity routes
//!
//! Both extractors are infallible: credentials and body problems are decided
//! behind the gate, so an anonymous caller with a broken body still gets 401.

use crate::core::gate::RequestContext;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde_json::Value;
use std::convert::Infallible;
use uuid::Uuid;

/// Header carrying a caller-supplied correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::new(parts.headers.clone());
        let supplied = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok());

        Ok(match supplied {
            Some(id) => ctx.with_request_id(id),
            None => ctx,
        })
    }
}

/// JSON request body, `Value::Null` when missing or unparseable
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBody(pub Value);

impl<S> FromRequest<S> for EntityBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = match Bytes::from_request(req, state).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(error = %err, "failed to read request body");
                return Ok(EntityBody(Value::Null));
            }
        };
        if bytes.is_empty() {
            return Ok(EntityBody(Value::Null));
        }

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(EntityBody(value)),
            Err(err) => {
                tracing::debug!(error = %err, "request body is not valid JSON");
                Ok(EntityBody(Value::Null))
            }
        }
    }
}

impl EntityBody {
    pub fn into_inner(self) -> Value {
        self.0
    }
}
