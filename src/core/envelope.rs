//! Uniform response envelope
//!
//! Every gated operation answers with `{"data": ..., "error": ...}` where
//! exactly one side is non-null. Paginated lists add a `pagination` object.
//! The transport status is carried next to the envelope, not inside it.

use crate::core::error::AccessError;
use crate::core::query::PaginationMeta;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Success/error wire shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,

    #[serde(default)]
    error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pagination: Option<PaginationMeta>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            pagination: None,
        }
    }

    pub fn paginated(data: T, meta: PaginationMeta) -> Self {
        Self {
            data: Some(data),
            error: None,
            pagination: Some(meta),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
            pagination: None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pagination(&self) -> Option<&PaginationMeta> {
        self.pagination.as_ref()
    }

    /// Exactly one of `data` / `error` is set
    pub fn is_well_formed(&self) -> bool {
        self.data.is_some() != self.error.is_some()
    }

    /// Decode into the success value or the error message
    ///
    /// A decoded envelope that breaks the one-of invariant is reported as an
    /// error, never as data.
    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, Some(error)) => Err(error),
            (None, None) => Err("response carried neither data nor error".to_string()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            data: self.data.map(f),
            error: self.error,
            pagination: self.pagination,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Status plus envelope, the terminal value of every gated handler
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResult<T> {
    pub status: StatusCode,
    pub envelope: Envelope<T>,
}

impl<T> HandlerResult<T> {
    pub fn ok(envelope: Envelope<T>) -> Self {
        Self {
            status: StatusCode::OK,
            envelope,
        }
    }

    pub fn error(err: &AccessError) -> Self {
        Self {
            status: err.status_code(),
            envelope: Envelope::failure(err.to_string()),
        }
    }

    /// Replace the status of a successful result (e.g. 201 on create)
    pub fn with_success_status(mut self, status: StatusCode) -> Self {
        if self.envelope.error.is_none() {
            self.status = status;
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl<T> From<Result<T, AccessError>> for HandlerResult<T> {
    fn from(result: Result<T, AccessError>) -> Self {
        match result {
            Ok(data) => HandlerResult::ok(Envelope::success(data)),
            Err(err) => HandlerResult::error(&err),
        }
    }
}

impl<T: Serialize> IntoResponse for HandlerResult<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
