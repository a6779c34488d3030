//! Configuration loading and management
//!
//! ```yaml
//! server:
//!   bind: 0.0.0.0:8080
//! auth:
//!   tokens:
//!     - token: s3cret
//!       subject: treasurer
//!       role: admin
//! client:
//!   timeout_ms: 5000
//! entities:
//!   committees:
//!     read: public
//!     default_sort: sort_order:asc,name:asc
//!     pagination: { default_limit: 10, max_limit: 50 }
//! ```

use crate::core::auth::{AccessPolicy, CallerIdentity, Role, TokenAuthProvider};
use crate::core::query::SortKey;
use crate::core::schema::{EntitySchema, FilterAlias, PaginationDefaults};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Address used when no config names one
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Client wait used when no config names one
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP server settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub bind: Option<String>,
}

/// One accepted bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub token: String,
    pub subject: String,
    #[serde(default = "default_token_role")]
    pub role: Role,
}

fn default_token_role() -> Role {
    Role::Authenticated
}

/// Identity settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

/// Fetch unit settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Per-entity adjustments applied on top of the built-in schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityOverride {
    /// Read policy: `public`, `authenticated` or `admin`
    #[serde(default)]
    pub read: Option<AccessPolicy>,

    /// Write policy, same values as `read`
    #[serde(default)]
    pub write: Option<AccessPolicy>,

    #[serde(default)]
    pub read_only: Option<bool>,

    /// Sort list in URL syntax (`field:asc,field:desc`)
    #[serde(default)]
    pub default_sort: Option<String>,

    #[serde(default)]
    pub pagination: Option<PaginationDefaults>,

    /// Extra URL parameter aliases
    #[serde(default)]
    pub filter_aliases: Vec<FilterAlias>,
}

impl EntityOverride {
    /// Apply this override to `schema`
    pub fn apply(&self, mut schema: EntitySchema) -> Result<EntitySchema> {
        if let Some(read) = self.read {
            schema.read = read;
        }
        if let Some(write) = self.write {
            schema.write = Some(write);
        }
        if self.read_only == Some(true) {
            schema.write = None;
        }
        if let Some(sort) = &self.default_sort {
            schema.default_sort = SortKey::parse_list(sort)
                .with_context(|| format!("invalid default_sort for '{}'", schema.name))?;
        }
        if let Some(pagination) = self.pagination {
            anyhow::ensure!(
                pagination.default_limit >= 1 && pagination.default_limit <= pagination.max_limit,
                "invalid pagination for '{}': default_limit must be within 1..={}",
                schema.name,
                pagination.max_limit
            );
            schema.pagination = pagination;
        }
        for alias in &self.filter_aliases {
            schema.filter_aliases.retain(|a| a.param != alias.param);
            schema.filter_aliases.push(alias.clone());
        }
        Ok(schema)
    }

    /// Overlay `later` onto `self`, later values winning
    fn merge(&mut self, later: EntityOverride) {
        if later.read.is_some() {
            self.read = later.read;
        }
        if later.write.is_some() {
            self.write = later.write;
        }
        if later.read_only.is_some() {
            self.read_only = later.read_only;
        }
        if later.default_sort.is_some() {
            self.default_sort = later.default_sort;
        }
        if later.pagination.is_some() {
            self.pagination = later.pagination;
        }
        for alias in later.filter_aliases {
            self.filter_aliases.retain(|a| a.param != alias.param);
            self.filter_aliases.push(alias);
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub client: ClientConfig,

    /// Overrides keyed by entity endpoint name
    #[serde(default)]
    pub entities: BTreeMap<String, EntityOverride>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge configs in order; later configs win
    ///
    /// Tokens are keyed by the token string and entity overrides are merged
    /// field by field.
    pub fn merge(configs: Vec<AppConfig>) -> AppConfig {
        let mut merged = AppConfig::default();
        for config in configs {
            if config.server.bind.is_some() {
                merged.server.bind = config.server.bind;
            }
            if config.client.timeout_ms.is_some() {
                merged.client.timeout_ms = config.client.timeout_ms;
            }
            for token in config.auth.tokens {
                merged.auth.tokens.retain(|t| t.token != token.token);
                merged.auth.tokens.push(token);
            }
            for (entity, entity_override) in config.entities {
                merged
                    .entities
                    .entry(entity)
                    .or_default()
                    .merge(entity_override);
            }
        }
        merged
    }

    pub fn bind_addr(&self) -> &str {
        self.server.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.client
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    /// Token table as an identity provider
    pub fn token_provider(&self) -> TokenAuthProvider {
        self.auth
            .tokens
            .iter()
            .fold(TokenAuthProvider::new(), |provider, t| {
                let identity = CallerIdentity {
                    subject: Some(t.subject.clone()),
                    role: t.role,
                };
                provider.with_token(t.token.clone(), identity)
            })
    }
}
