//! Fetch units: one entity list kept in sync with the server
//!
//! Every `mount()` or `refetch()` takes the next sequence number. When an
//! attempt completes it commits only if its number is still the latest;
//! superseded completions are dropped without touching state. Failures
//! commit the configured message, the raw error goes to the log.

use crate::client::endpoint::Endpoint;
use crate::client::error::FetchError;
use crate::client::state::FetchState;
use crate::client::transport::Transport;
use crate::config::DEFAULT_FETCH_TIMEOUT;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Declarative description of a fetch unit
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub endpoint: Endpoint,

    /// Entity name reported in state and logs
    pub entity_name: String,

    /// User-facing message committed on any failure
    pub error_message: String,

    /// Start a fetch from `mount()`
    pub fetch_on_mount: bool,

    /// Bounded wait for one attempt
    pub timeout: Duration,
}

impl FetcherConfig {
    pub fn new(
        endpoint: Endpoint,
        entity_name: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            entity_name: entity_name.into(),
            error_message: error_message.into(),
            fetch_on_mount: true,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn fetch_on_mount(mut self, fetch_on_mount: bool) -> Self {
        self.fetch_on_mount = fetch_on_mount;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

struct Inner<T> {
    config: FetcherConfig,
    transport: Arc<dyn Transport>,
    sequence: AtomicU64,
    state: watch::Sender<FetchState<T>>,
}

/// Stateful client view of one entity list
pub struct FetchUnit<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for FetchUnit<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Build a fetch unit in the `Idle` state
pub fn create_fetcher<T>(config: FetcherConfig, transport: Arc<dyn Transport>) -> FetchUnit<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let (state, _) = watch::channel(FetchState::idle(config.entity_name.clone()));
    FetchUnit {
        inner: Arc::new(Inner {
            config,
            transport,
            sequence: AtomicU64::new(0),
            state,
        }),
    }
}

impl<T> FetchUnit<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Snapshot of the current state
    pub fn state(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every committed transition
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.inner.config
    }

    /// Start the initial fetch in the background when `fetch_on_mount` is set
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        if !self.inner.config.fetch_on_mount {
            return None;
        }
        let unit = self.clone();
        Some(tokio::spawn(async move { unit.refetch().await }))
    }

    /// Run one attempt to completion
    ///
    /// Returns once the attempt has committed or been dropped as stale.
    pub async fn refetch(&self) {
        let sequence = self.begin();
        let config = &self.inner.config;

        let result = match tokio::time::timeout(
            config.timeout,
            self.inner.transport.get(&config.endpoint),
        )
        .await
        {
            Ok(Ok(value)) => serde_json::from_value::<Vec<T>>(value).map_err(FetchError::from),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(FetchError::Timeout(config.timeout)),
        };

        self.commit(sequence, result);
    }

    fn begin(&self) -> u64 {
        let mut sequence = 0;
        self.inner.state.send_modify(|state| {
            sequence = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            state.start();
        });
        tracing::debug!(
            entity = %self.inner.config.entity_name,
            endpoint = %self.inner.config.endpoint,
            sequence,
            "fetch started"
        );
        sequence
    }

    fn commit(&self, sequence: u64, result: Result<Vec<T>, FetchError>) {
        let config = &self.inner.config;
        self.inner.state.send_if_modified(|state| {
            let latest = self.inner.sequence.load(Ordering::SeqCst);
            if sequence != latest {
                tracing::debug!(
                    entity = %config.entity_name,
                    sequence,
                    latest,
                    "dropping stale fetch result"
                );
                return false;
            }

            match result {
                Ok(rows) => state.succeed(rows),
                Err(err) => {
                    tracing::error!(
                        entity = %config.entity_name,
                        endpoint = %config.endpoint,
                        error = %err,
                        "fetch failed"
                    );
                    state.fail(config.error_message.clone());
                }
            }
            true
        });
    }
}
