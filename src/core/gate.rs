//! Authorization gate
//!
//! Every entity operation runs through [`Gate::run`]: the caller identity is
//! resolved from the explicit [`RequestContext`], checked against the
//! operation's [`AccessPolicy`], and only then is the body handed a store
//! handle. Nothing touches the store before the check passes.

use crate::core::auth::{AccessPolicy, AuthProvider, CallerIdentity};
use crate::core::envelope::{Envelope, HandlerResult};
use crate::core::error::AccessError;
use crate::core::store::DataStore;
use axum::http::header::{AUTHORIZATION, HeaderValue};
use axum::http::HeaderMap;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;
use uuid::Uuid;

/// Credentials and correlation id of one incoming request
#[derive(Debug, Clone)]
pub struct RequestContext {
    headers: HeaderMap,
    request_id: Uuid,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            request_id: Uuid::new_v4(),
        }
    }

    /// A context without credentials
    pub fn anonymous() -> Self {
        Self::new(HeaderMap::new())
    }

    /// A context carrying `Authorization: Bearer <token>`
    pub fn with_bearer(token: &str) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, value);
        }
        Self::new(headers)
    }

    /// Keep a correlation id supplied by the caller
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Store access granted to a body for the duration of one request
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<dyn DataStore>,
}

impl Deref for StoreHandle {
    type Target = dyn DataStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

/// Identity check in front of the data store
#[derive(Clone)]
pub struct Gate {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DataStore>,
}

impl Gate {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DataStore>) -> Self {
        Self { auth, store }
    }

    /// Resolve the caller and check it against `policy`
    ///
    /// An unresolvable identity is treated as anonymous.
    pub async fn admit(
        &self,
        ctx: &RequestContext,
        policy: AccessPolicy,
    ) -> Result<CallerIdentity, AccessError> {
        let identity = match self.auth.resolve(ctx.headers()).await {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    error = %err,
                    "identity resolution failed, treating caller as anonymous"
                );
                CallerIdentity::anonymous()
            }
        };

        let required = policy.required_role();
        if identity.role.satisfies(required) {
            tracing::debug!(
                request_id = %ctx.request_id(),
                role = %identity.role,
                ?policy,
                "request admitted"
            );
            return Ok(identity);
        }

        tracing::warn!(
            request_id = %ctx.request_id(),
            role = %identity.role,
            required = %required,
            "request denied"
        );
        if identity.is_anonymous() {
            Err(AccessError::AuthenticationMissing)
        } else {
            Err(AccessError::AuthorizationInsufficient {
                required,
                actual: identity.role,
            })
        }
    }

    /// Run `body` behind the access check
    ///
    /// Errors from the body are passed through, except that auth statuses are
    /// reserved for the gate: an auth variant raised inside the body becomes
    /// a `DomainFailure`.
    pub async fn run<T, F, Fut>(
        &self,
        ctx: &RequestContext,
        policy: AccessPolicy,
        body: F,
    ) -> Result<T, AccessError>
    where
        F: FnOnce(CallerIdentity, StoreHandle) -> Fut,
        Fut: Future<Output = Result<T, AccessError>>,
    {
        let identity = self.admit(ctx, policy).await?;
        let handle = StoreHandle {
            store: self.store.clone(),
        };

        body(identity, handle).await.map_err(|err| {
            let err = if err.is_auth_failure() {
                AccessError::DomainFailure {
                    message: err.to_string(),
                }
            } else {
                err
            };
            match &err {
                AccessError::ValidationFailed { .. }
                | AccessError::NotFound { .. }
                | AccessError::MethodNotAllowed { .. } => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        error = %err,
                        "request rejected"
                    );
                }
                _ => {
                    tracing::error!(
                        request_id = %ctx.request_id(),
                        code = err.error_code(),
                        error = %err,
                        "request failed"
                    );
                }
            }
            err
        })
    }

    /// [`Gate::run`] folded into a status plus envelope
    pub async fn handle<T, F, Fut>(
        &self,
        ctx: &RequestContext,
        policy: AccessPolicy,
        body: F,
    ) -> HandlerResult<T>
    where
        F: FnOnce(CallerIdentity, StoreHandle) -> Fut,
        Fut: Future<Output = Result<T, AccessError>>,
    {
        match self.run(ctx, policy, body).await {
            Ok(data) => HandlerResult::ok(Envelope::success(data)),
            Err(err) => HandlerResult::error(&err),
        }
    }
}
