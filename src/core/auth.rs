//! Caller identity and access policies
//!
//! Identities are resolved once per request by an [`AuthProvider`] and are
//! never mutated afterwards. Roles are totally ordered:
//! `Anonymous < Authenticated < Admin`.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Role classification of a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Anonymous,
    Authenticated,
    Admin,
}

impl Role {
    /// True when this role meets or exceeds `required`
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Anonymous => "anonymous",
            Role::Authenticated => "authenticated",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

/// A resolved caller: opaque subject id plus role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Subject identifier issued by the authentication collaborator
    pub subject: Option<String>,
    pub role: Role,
}

impl CallerIdentity {
    pub fn anonymous() -> Self {
        Self {
            subject: None,
            role: Role::Anonymous,
        }
    }

    pub fn authenticated(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            role: Role::Authenticated,
        }
    }

    pub fn admin(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            role: Role::Admin,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.role == Role::Anonymous
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Access requirement for an entity operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// No authentication required
    Public,

    /// Any authenticated caller
    Authenticated,

    /// Admin callers only
    #[serde(alias = "admin_only")]
    Admin,
}

impl AccessPolicy {
    /// The minimum role this policy admits
    pub fn required_role(self) -> Role {
        match self {
            AccessPolicy::Public => Role::Anonymous,
            AccessPolicy::Authenticated => Role::Authenticated,
            AccessPolicy::Admin => Role::Admin,
        }
    }

    /// Check if an identity satisfies this policy
    pub fn check(self, identity: &CallerIdentity) -> bool {
        identity.role.satisfies(self.required_role())
    }
}

/// Trait for identity resolution
///
/// Implementations turn request credentials into a [`CallerIdentity`].
/// Returning an error means the identity is unresolvable; the gate then
/// treats the caller as anonymous.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<CallerIdentity>;
}

/// Default no-auth provider (every caller is anonymous)
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn resolve(&self, _headers: &HeaderMap) -> Result<CallerIdentity> {
        Ok(CallerIdentity::anonymous())
    }
}

/// Provider backed by a static table of bearer tokens
///
/// A request without an `Authorization` header is anonymous; a bearer token
/// missing from the table fails resolution.
#[derive(Debug, Clone, Default)]
pub struct TokenAuthProvider {
    tokens: HashMap<String, CallerIdentity>,
}

impl TokenAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for an identity
    pub fn with_token(mut self, token: impl Into<String>, identity: CallerIdentity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<CallerIdentity> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(CallerIdentity::anonymous());
        };

        let value = value
            .to_str()
            .map_err(|_| anyhow!("authorization header is not valid ASCII"))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| anyhow!("unsupported authorization scheme"))?;

        self.tokens
            .get(token.trim())
            .cloned()
            .ok_or_else(|| anyhow!("unknown bearer token"))
    }
}
