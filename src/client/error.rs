//! Client-side fetch failures
//!
//! These carry the raw detail for operator logs. Fetch units never commit
//! them to state; the configured user-facing message is committed instead.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with an error envelope
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response body did not decode
    #[error("decode error: {0}")]
    Decode(String),

    /// No response within the configured wait
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
