//! Typed errors for the access layer
//!
//! - [`QueryError`]: a descriptor that does not fit the entity schema
//! - [`StoreError`]: a failure reported by the data store collaborator
//! - [`AccessError`]: everything a gated operation can end with; maps onto
//!   an HTTP status and the error envelope
//!
//! Authentication and authorization variants are only ever produced by the
//! gate. Store messages are carried through unchanged.

use crate::core::auth::Role;
use crate::core::envelope::Envelope;
use crate::core::validation::FieldViolation;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Descriptor validation and parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Unknown field '{field}' for {entity}")]
    UnknownField { entity: String, field: String },

    #[error("Page size {limit} is out of range (1..={max})")]
    InvalidPageSize { limit: usize, max: usize },

    #[error("Page {page} is invalid, pages start at 1")]
    InvalidPage { page: usize },

    #[error("Invalid sort direction '{direction}' for field '{field}'")]
    InvalidSortDirection { field: String, direction: String },

    #[error("Malformed filter: {message}")]
    MalformedFilter { message: String },

    #[error("Malformed query parameter '{name}': '{value}'")]
    MalformedParameter { name: String, value: String },
}

/// Failures reported by a [`DataStore`](crate::core::store::DataStore)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Uniqueness or referential violation
    #[error("{0}")]
    Conflict(String),

    /// The store could not be reached
    #[error("{0}")]
    Unavailable(String),

    /// Any other rejection
    #[error("{0}")]
    Rejected(String),
}

/// Terminal failure of a gated operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Unauthorized")]
    AuthenticationMissing,

    #[error("Forbidden")]
    AuthorizationInsufficient { required: Role, actual: Role },

    #[error("{message}")]
    ValidationFailed {
        message: String,
        violations: Vec<FieldViolation>,
    },

    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    #[error("Entity '{entity}' not found")]
    UnknownEntity { entity: String },

    #[error("Entity '{entity}' does not support {operation}")]
    MethodNotAllowed { entity: String, operation: String },

    #[error("{message}")]
    StoreConflict { message: String },

    #[error("{message}")]
    StoreUnavailable { message: String },

    #[error("{message}")]
    DomainFailure { message: String },
}

impl AccessError {
    /// Build a validation failure from field violations
    pub fn invalid_body(violations: Vec<FieldViolation>) -> Self {
        let message = violations
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        AccessError::ValidationFailed {
            message,
            violations,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccessError::AuthenticationMissing => StatusCode::UNAUTHORIZED,
            AccessError::AuthorizationInsufficient { .. } => StatusCode::FORBIDDEN,
            AccessError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            AccessError::NotFound { .. } | AccessError::UnknownEntity { .. } => {
                StatusCode::NOT_FOUND
            }
            AccessError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AccessError::StoreConflict { .. }
            | AccessError::StoreUnavailable { .. }
            | AccessError::DomainFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::AuthenticationMissing => "AUTHENTICATION_MISSING",
            AccessError::AuthorizationInsufficient { .. } => "AUTHORIZATION_INSUFFICIENT",
            AccessError::ValidationFailed { .. } => "VALIDATION_FAILED",
            AccessError::NotFound { .. } => "NOT_FOUND",
            AccessError::UnknownEntity { .. } => "UNKNOWN_ENTITY",
            AccessError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            AccessError::StoreConflict { .. } => "STORE_CONFLICT",
            AccessError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            AccessError::DomainFailure { .. } => "DOMAIN_FAILURE",
        }
    }

    /// True for the two variants only the gate may produce
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AccessError::AuthenticationMissing | AccessError::AuthorizationInsufficient { .. }
        )
    }
}

impl From<QueryError> for AccessError {
    fn from(err: QueryError) -> Self {
        AccessError::ValidationFailed {
            message: err.to_string(),
            violations: Vec::new(),
        }
    }
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => AccessError::StoreConflict { message },
            StoreError::Unavailable(message) => AccessError::StoreUnavailable { message },
            StoreError::Rejected(message) => AccessError::DomainFailure { message },
        }
    }
}

impl From<serde_json::Error> for AccessError {
    fn from(err: serde_json::Error) -> Self {
        AccessError::DomainFailure {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Envelope::<()>::failure(self.to_string())).into_response()
    }
}
