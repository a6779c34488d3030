//! Gate and typed access behaviour with an instrumented store

use async_trait::async_trait;
use clubhouse::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory store that counts every call it receives
#[derive(Clone, Default)]
struct SpyStore {
    inner: InMemoryStore,
    calls: Arc<AtomicUsize>,
}

impl SpyStore {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DataStore for SpyStore {
    async fn query(&self, entity: &str, descriptor: &QueryDescriptor) -> Result<Page, StoreError> {
        self.touch();
        self.inner.query(entity, descriptor).await
    }

    async fn fetch(&self, entity: &str, id: &str) -> Result<Option<Row>, StoreError> {
        self.touch();
        self.inner.fetch(entity, id).await
    }

    async fn insert(&self, entity: &str, row: Row) -> Result<Row, StoreError> {
        self.touch();
        self.inner.insert(entity, row).await
    }

    async fn update(&self, entity: &str, id: &str, patch: Row) -> Result<Option<Row>, StoreError> {
        self.touch();
        self.inner.update(entity, id, patch).await
    }

    async fn delete(&self, entity: &str, id: &str) -> Result<bool, StoreError> {
        self.touch();
        self.inner.delete(entity, id).await
    }
}

fn gate(store: &SpyStore) -> Gate {
    let auth = TokenAuthProvider::new()
        .with_token("member", CallerIdentity::authenticated("m-1"))
        .with_token("admin", CallerIdentity::admin("a-1"));
    Gate::new(Arc::new(auth), Arc::new(store.clone()))
}

#[tokio::test]
async fn test_denied_requests_never_reach_the_store() {
    let store = SpyStore::default();
    let grants = EntityAccess::<Grant>::new(gate(&store));
    let profiles = EntityAccess::<UserProfile>::new(gate(&store));
    let seasons = EntityAccess::<Season>::new(gate(&store));
    let member = RequestContext::with_bearer("member");
    let anonymous = RequestContext::anonymous();

    let denied = [
        grants.list(&anonymous, &QueryDescriptor::new()).await.err(),
        profiles.list(&member, &QueryDescriptor::new()).await.err(),
        seasons.get(&anonymous, "s-1").await.err(),
        grants.get(&anonymous, "g-1").await.err(),
        grants
            .create(&member, &json!({"name": "Youth fund", "month": 4}))
            .await
            .err(),
        grants.update(&member, "g-1", &json!({"month": 5})).await.err(),
        grants.delete(&anonymous, "g-1").await.err(),
    ];

    for err in denied {
        let err = err.expect("request is denied");
        assert!(err.is_auth_failure(), "unexpected {err:?}");
    }
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_invalid_descriptor_is_rejected_before_the_store() {
    let store = SpyStore::default();
    let committees = EntityAccess::<Committee>::new(gate(&store));
    let member = RequestContext::with_bearer("member");

    let err = committees
        .list(&member, &QueryDescriptor::new().paginate(1, 500))
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::ValidationFailed { .. }));

    let err = committees
        .list(&member, &QueryDescriptor::new().filter("secret", FilterOp::Eq, "x"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("secret"));
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_empty_filter_set_matches_unfiltered_listing() {
    let store = SpyStore::default();
    store
        .inner
        .seed(
            "committees",
            ["Board", "Events", "Youth"]
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    json!({"name": name, "sort_order": i})
                        .as_object()
                        .cloned()
                        .unwrap()
                }),
        )
        .unwrap();
    let committees = EntityAccess::<Committee>::new(gate(&store));
    let member = RequestContext::with_bearer("member");

    let plain = committees
        .list(&member, &QueryDescriptor::new())
        .await
        .unwrap();
    let filtered = committees
        .list(&member, &QueryDescriptor::new().with_filters(FilterSet::new()))
        .await
        .unwrap();
    assert_eq!(plain, filtered);
    assert_eq!(plain.rows.len(), 3);
    assert!(plain.meta.is_none());
}

#[tokio::test]
async fn test_validate_is_idempotent() {
    let schema = Committee::schema();
    let descriptor = QueryDescriptor::new()
        .filter("is_active", FilterOp::Eq, true)
        .sort_by("sort_order", SortDirection::Ascending)
        .paginate(2, 10);

    assert_eq!(descriptor.validate(&schema), Ok(()));
    assert_eq!(descriptor.validate(&schema), Ok(()));

    let bad = QueryDescriptor::new().paginate(0, 10);
    let first = bad.validate(&schema);
    assert!(first.is_err());
    assert_eq!(first, bad.validate(&schema));
}

#[tokio::test]
async fn test_typed_round_trip_through_access() {
    let store = SpyStore::default();
    let committees = EntityAccess::<Committee>::new(gate(&store));
    let admin = RequestContext::with_bearer("admin");
    let member = RequestContext::with_bearer("member");

    let created = committees
        .create(
            &admin,
            &Committee {
                name: "Board".into(),
                sort_order: 1,
                is_active: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!created.id.is_empty());
    assert!(created.created_at.is_some());

    let updated = committees
        .update(&admin, &created.id, &json!({"is_active": false}))
        .await
        .unwrap();
    assert_eq!(updated.name, "Board");
    assert!(!updated.is_active);
    assert!(updated.updated_at >= created.updated_at);

    let page = committees
        .list(
            &member,
            &QueryDescriptor::new()
                .filter("is_active", FilterOp::Eq, false)
                .paginate(1, 10),
        )
        .await
        .unwrap();
    assert_eq!(page.rows, vec![updated.clone()]);
    assert_eq!(page.meta.map(|m| m.total), Some(1));

    assert_eq!(
        committees.delete(&admin, &created.id).await.unwrap(),
        Deleted { success: true }
    );
    let err = committees.get(&member, &created.id).await.unwrap_err();
    assert_eq!(
        err,
        AccessError::NotFound {
            entity: "committee".into(),
            id: created.id.clone()
        }
    );
}

#[tokio::test]
async fn test_read_only_entity_refuses_writes_after_the_gate() {
    let store = SpyStore::default();
    let roles = EntityAccess::<RoleDefinition>::new(gate(&store));
    let admin = RequestContext::with_bearer("admin");

    let err = roles
        .create(&admin, &json!({"name": "coach", "display_name": "Coach"}))
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::MethodNotAllowed { .. }));
    assert_eq!(store.calls(), 0);

    let member = RequestContext::with_bearer("member");
    let err = roles
        .create(&member, &json!({"name": "coach", "display_name": "Coach"}))
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::AuthorizationInsufficient { .. }));
    assert_eq!(store.calls(), 0);

    let listing = roles.list(&member, &QueryDescriptor::new()).await.unwrap();
    assert!(listing.rows.is_empty());
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn test_public_list_still_needs_sign_in_for_one_row() {
    let store = SpyStore::default();
    store
        .inner
        .seed(
            "seasons",
            [json!({"id": "s-1", "name": "2024/25", "start_date": "2024-09-01"})
                .as_object()
                .cloned()
                .unwrap()],
        )
        .unwrap();
    let seasons = EntityAccess::<Season>::new(gate(&store));

    let listing = seasons
        .list(&RequestContext::anonymous(), &QueryDescriptor::new())
        .await
        .unwrap();
    assert_eq!(listing.rows.len(), 1);

    let err = seasons.get(&RequestContext::anonymous(), "s-1").await.unwrap_err();
    assert_eq!(err, AccessError::AuthenticationMissing);
    assert_eq!(store.calls(), 1);

    let season = seasons
        .get(&RequestContext::with_bearer("member"), "s-1")
        .await
        .unwrap();
    assert_eq!(season.name, "2024/25");
}
