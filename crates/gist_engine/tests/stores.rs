mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{file, gist, init_logging, network_error, FakeApi};
use gist_core::{FailureKind, MutationOutcome};
use gist_engine::{ForkedStore, StarredStore};
use pretty_assertions::assert_eq;

fn ids(store: &StarredStore) -> Vec<String> {
    store.snapshot().iter().map(|gist| gist.id.clone()).collect()
}

fn fake_with(ids: &[&str]) -> Arc<FakeApi> {
    init_logging();
    let api = FakeApi::default();
    for id in ids {
        api.serve(gist(id, vec![file("a.txt", None)]));
    }
    Arc::new(api)
}

#[tokio::test]
async fn load_replaces_the_set_with_remote_starred() {
    let api = fake_with(&["a", "b", "c"]);
    *api.starred.lock().unwrap() = vec!["a".to_string(), "c".to_string()];
    let store = StarredStore::new(api.clone());

    store.load().await.unwrap();
    assert_eq!(ids(&store), vec!["a", "c"]);
    assert!(store.is_starred("c"));
    assert!(!store.is_starred("b"));
}

#[tokio::test]
async fn starring_adds_exactly_one_entry_and_never_duplicates() {
    let api = fake_with(&["a", "b"]);
    let store = StarredStore::new(api.clone());

    assert_eq!(store.star("a").await.unwrap(), MutationOutcome::Applied);
    assert_eq!(ids(&store), vec!["a"]);

    assert_eq!(store.star("a").await.unwrap(), MutationOutcome::Unchanged);
    assert_eq!(ids(&store), vec!["a"]);
    assert_eq!(api.count("star:a"), 2);
    assert_eq!(api.count("get:a"), 1);
}

#[tokio::test]
async fn unstarring_removes_only_the_matching_entry() {
    let api = fake_with(&["a", "b", "c"]);
    *api.starred.lock().unwrap() = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let store = StarredStore::new(api.clone());
    store.load().await.unwrap();

    assert_eq!(store.unstar("b").await.unwrap(), MutationOutcome::Applied);
    assert_eq!(ids(&store), vec!["a", "c"]);
    assert_eq!(store.unstar("b").await.unwrap(), MutationOutcome::Unchanged);
}

#[tokio::test]
async fn failed_star_leaves_the_set_untouched() {
    let api = fake_with(&["a", "b"]);
    let store = StarredStore::new(api.clone());
    store.star("a").await.unwrap();
    let before = store.snapshot();

    *api.star_failure.lock().unwrap() = Some(network_error());
    let err = store.star("b").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[tokio::test]
async fn star_whose_follow_up_fetch_fails_is_remote_only() {
    let api = fake_with(&["a"]);
    api.failing_gets.lock().unwrap().insert("a".to_string());
    let store = StarredStore::new(api.clone());

    assert_eq!(store.star("a").await.unwrap(), MutationOutcome::RemoteOnly);
    assert!(store.snapshot().is_empty());
    assert!(api.starred.lock().unwrap().contains(&"a".to_string()));
}

#[tokio::test]
async fn membership_tracks_the_latest_published_snapshot() {
    let api = fake_with(&["a", "b"]);
    let store = StarredStore::new(api.clone());
    let mut rx = store.subscribe();

    store.star("a").await.unwrap();
    assert!(rx.has_changed().unwrap());
    let published = rx.borrow_and_update().clone();
    assert_eq!(published.len(), 1);
    assert_eq!(store.is_starred("a"), published.iter().any(|g| g.id == "a"));

    store.unstar("a").await.unwrap();
    let published = rx.borrow_and_update().clone();
    assert!(published.is_empty());
    assert!(!store.is_starred("a"));
}

#[tokio::test]
async fn late_subscriber_sees_the_latest_snapshot() {
    let api = fake_with(&["a", "b"]);
    let store = StarredStore::new(api.clone());
    store.star("a").await.unwrap();
    store.star("b").await.unwrap();

    let rx = store.subscribe();
    let ids: Vec<_> = rx.borrow().iter().map(|g| g.id.clone()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn every_mutation_publishes_a_new_snapshot() {
    let api = fake_with(&["a", "b"]);
    let store = StarredStore::new(api.clone());
    store.star("a").await.unwrap();
    let first = store.snapshot();
    store.star("b").await.unwrap();

    assert_eq!(first.len(), 1);
    assert!(!Arc::ptr_eq(&first, &store.snapshot()));
}

#[tokio::test(start_paused = true)]
async fn concurrent_mutations_apply_in_issue_order() {
    let api = Arc::new(FakeApi::with_delay(Duration::from_millis(50)));
    api.serve(gist("a", vec![file("a.txt", None)]));
    let store = Arc::new(StarredStore::new(api.clone()));

    let star = tokio::spawn({
        let store = store.clone();
        async move { store.star("a").await }
    });
    tokio::task::yield_now().await;
    let unstar = tokio::spawn({
        let store = store.clone();
        async move { store.unstar("a").await }
    });

    assert_eq!(star.await.unwrap().unwrap(), MutationOutcome::Applied);
    assert_eq!(unstar.await.unwrap().unwrap(), MutationOutcome::Applied);
    assert!(store.snapshot().is_empty());
    assert_eq!(api.calls(), vec!["star:a", "get:a", "unstar:a"]);
}

#[tokio::test]
async fn fork_records_the_source_once() {
    let api = fake_with(&["a"]);
    let store = ForkedStore::new(api.clone());
    assert!(!store.is_forked("a"));

    assert_eq!(store.fork("a").await.unwrap(), MutationOutcome::Applied);
    assert!(store.is_forked("a"));
    assert_eq!(store.snapshot()[0].fork.id, "fork-of-a");

    assert_eq!(store.fork("a").await.unwrap(), MutationOutcome::Unchanged);
    assert_eq!(api.count("fork:"), 1);
    assert_eq!(store.forked_sources().to_vec(), vec!["a".to_string()]);
}

#[tokio::test]
async fn failed_fork_records_nothing() {
    let api = fake_with(&[]);
    let store = ForkedStore::new(api.clone());

    let err = store.fork("ghost").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
    assert!(store.snapshot().is_empty());
    assert!(!store.is_forked("ghost"));
}
