//! Fetch unit behaviour against scripted and real transports

use async_trait::async_trait;
use clubhouse::prelude::*;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

// =============================================================================
// Scripted transport
// =============================================================================

type Reply = Result<Value, FetchError>;

/// Each call waits on the next scripted reply, so the test decides the
/// completion order
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn script(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(rx);
        tx
    }

    async fn wait_for_calls(&self, n: usize) {
        while self.calls.load(Ordering::SeqCst) < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, _endpoint: &Endpoint) -> Result<Value, FetchError> {
        let reply = self.replies.lock().unwrap().pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Transport("script dropped".into()))),
            None => Err(FetchError::Transport("no scripted reply".into())),
        }
    }
}

fn committees_config() -> FetcherConfig {
    FetcherConfig::new(
        Endpoint::entity("committees"),
        "committees",
        "Loading committees failed",
    )
}

mod latest_wins_tests {
    use super::*;

    #[tokio::test]
    async fn test_older_completion_after_newer_is_dropped() {
        let transport = Arc::new(ScriptedTransport::default());
        let first = transport.script();
        let second = transport.script();
        let unit = create_fetcher::<Value>(committees_config(), transport.clone());

        let a = tokio::spawn({
            let unit = unit.clone();
            async move { unit.refetch().await }
        });
        transport.wait_for_calls(1).await;
        let b = tokio::spawn({
            let unit = unit.clone();
            async move { unit.refetch().await }
        });
        transport.wait_for_calls(2).await;
        assert!(unit.state().loading);

        second.send(Ok(json!([{"name": "newer"}]))).unwrap();
        b.await.unwrap();
        assert_eq!(unit.state().data, Some(vec![json!({"name": "newer"})]));

        first.send(Ok(json!([{"name": "older"}]))).unwrap();
        a.await.unwrap();

        let state = unit.state();
        assert_eq!(state.phase, FetchPhase::Success);
        assert_eq!(state.data, Some(vec![json!({"name": "newer"})]));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_stale_failure_does_not_clobber_pending_fetch() {
        let transport = Arc::new(ScriptedTransport::default());
        let first = transport.script();
        let second = transport.script();
        let unit = create_fetcher::<Value>(committees_config(), transport.clone());

        let a = tokio::spawn({
            let unit = unit.clone();
            async move { unit.refetch().await }
        });
        transport.wait_for_calls(1).await;
        let b = tokio::spawn({
            let unit = unit.clone();
            async move { unit.refetch().await }
        });
        transport.wait_for_calls(2).await;

        first
            .send(Err(FetchError::Transport("connection reset".into())))
            .unwrap();
        a.await.unwrap();
        let state = unit.state();
        assert!(state.loading);
        assert_eq!(state.error, None);

        second.send(Ok(json!([]))).unwrap();
        b.await.unwrap();
        let state = unit.state();
        assert_eq!(state.phase, FetchPhase::Success);
        assert_eq!(state.data, Some(vec![]));
    }

    #[tokio::test]
    async fn test_refetch_after_failure_recovers() {
        let transport = Arc::new(ScriptedTransport::default());
        let unit = create_fetcher::<Value>(committees_config(), transport.clone());

        transport
            .script()
            .send(Err(FetchError::Server {
                status: 500,
                message: "boom".into(),
            }))
            .unwrap();
        unit.refetch().await;
        assert_eq!(unit.state().error.as_deref(), Some("Loading committees failed"));

        transport.script().send(Ok(json!([{"name": "Board"}]))).unwrap();
        unit.refetch().await;
        let state = unit.state();
        assert_eq!(state.error, None);
        assert_eq!(state.data.map(|rows| rows.len()), Some(1));
    }
}

// =============================================================================
// Against a running server
// =============================================================================

/// Store whose every call fails with a uniqueness violation
struct ConflictingStore;

#[async_trait]
impl DataStore for ConflictingStore {
    async fn query(&self, _: &str, _: &QueryDescriptor) -> Result<Page, StoreError> {
        Err(conflict())
    }

    async fn fetch(&self, _: &str, _: &str) -> Result<Option<Row>, StoreError> {
        Err(conflict())
    }

    async fn insert(&self, _: &str, _: Row) -> Result<Row, StoreError> {
        Err(conflict())
    }

    async fn update(&self, _: &str, _: &str, _: Row) -> Result<Option<Row>, StoreError> {
        Err(conflict())
    }

    async fn delete(&self, _: &str, _: &str) -> Result<bool, StoreError> {
        Err(conflict())
    }
}

fn conflict() -> StoreError {
    StoreError::Conflict("duplicate key value violates unique constraint".into())
}

async fn spawn_server(builder: ServerBuilder) -> String {
    let app = builder.build().expect("Failed to build app");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

mod http_tests {
    use super::*;

    #[tokio::test]
    async fn test_store_failure_settles_to_configured_message() {
        let base = spawn_server(
            ServerBuilder::new()
                .with_store(ConflictingStore)
                .with_builtin_entities(),
        )
        .await;

        let unit = create_fetcher::<Season>(
            FetcherConfig::new(Endpoint::entity("seasons"), "seasons", "X failed"),
            Arc::new(HttpTransport::new(base)),
        );
        unit.mount().expect("fetch on mount").await.unwrap();

        let state = unit.state();
        assert_eq!(state.data, None);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("X failed"));
    }

    #[tokio::test]
    async fn test_paginated_list_decodes_into_entities() {
        let store = InMemoryStore::new();
        store
            .seed(
                "committees",
                (1..=5).map(|i| {
                    json!({"name": format!("Committee {i}"), "sort_order": i})
                        .as_object()
                        .cloned()
                        .unwrap()
                }),
            )
            .unwrap();
        let auth =
            TokenAuthProvider::new().with_token("coach", CallerIdentity::authenticated("c-1"));
        let base = spawn_server(
            ServerBuilder::new()
                .with_store(store)
                .with_auth_provider(auth)
                .with_builtin_entities(),
        )
        .await;

        let endpoint = Endpoint::entity("committees").with_descriptor(
            &QueryDescriptor::new()
                .sort_by("sort_order", SortDirection::Descending)
                .paginate(1, 2),
        );
        let unit = create_fetcher::<Committee>(
            FetcherConfig::new(endpoint, "committees", "Loading committees failed"),
            Arc::new(HttpTransport::new(base.clone()).with_bearer("coach")),
        );
        unit.refetch().await;

        let rows = unit.state().data.expect("committees loaded");
        let names: Vec<_> = rows.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Committee 5", "Committee 4"]);

        // Without the bearer the gate answers 401 and the unit fails
        let anonymous = create_fetcher::<Committee>(
            FetcherConfig::new(Endpoint::entity("committees"), "committees", "Please sign in"),
            Arc::new(HttpTransport::new(base)),
        );
        anonymous.refetch().await;
        assert_eq!(anonymous.state().error.as_deref(), Some("Please sign in"));
    }
}
