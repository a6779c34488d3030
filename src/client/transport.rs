//! Transport seam between fetch units and the server

use crate::client::endpoint::Endpoint;
use crate::client::error::FetchError;
use crate::core::envelope::Envelope;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

/// Performs one list request and returns the decoded envelope
///
/// Server error envelopes are returned as `FetchError::Server`; an `Ok`
/// value always carries data.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, endpoint: &Endpoint) -> Result<Value, FetchError>;
}

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: None,
        }
    }

    /// Send `Authorization: Bearer <token>` on every request
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let mut request = self.client.get(&url).query(endpoint.query());
        if let Some(token) = &self.bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        let envelope: Envelope<Value> = response.json().await?;

        match envelope.into_result() {
            Ok(data) if status.is_success() => Ok(data),
            Ok(_) => Err(FetchError::Server {
                status: status.as_u16(),
                message: format!("unexpected status {}", status),
            }),
            Err(message) => Err(FetchError::Server {
                status: status.as_u16(),
                message,
            }),
        }
    }
}
