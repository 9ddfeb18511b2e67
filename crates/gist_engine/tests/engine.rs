mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{file, gist, init_logging, with_content, FakeApi};
use gist_core::{update, Action, AppState, Effect, ListSource, Msg, MutationOutcome};
use gist_engine::{EngineCommand, EngineEvent, EngineHandle};
use pretty_assertions::assert_eq;

const WAIT: Duration = Duration::from_secs(5);

fn engine_with(api: Arc<FakeApi>) -> EngineHandle {
    init_logging();
    EngineHandle::with_api(api, Duration::from_millis(30)).unwrap()
}

/// Waits for the first event accepted by `pick`, dropping the others.
fn wait_for<T>(engine: &EngineHandle, mut pick: impl FnMut(EngineEvent) -> Option<T>) -> T {
    let deadline = Instant::now() + WAIT;
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        if let Some(found) = engine.recv_timeout(left).and_then(&mut pick) {
            return found;
        }
    }
    panic!("event did not arrive in time");
}

fn public_fixture(count: usize) -> Arc<FakeApi> {
    let api = FakeApi::with_delay(Duration::from_millis(5));
    for n in 0..count {
        let summary = gist(&format!("g{n}"), vec![file("main.rs", None)]);
        api.serve(with_content(summary.clone(), "code"));
        api.public.lock().unwrap().push(summary);
    }
    Arc::new(api)
}

#[test]
fn public_page_of_ten_loads_once_after_all_previews() {
    let api = public_fixture(10);
    let engine = engine_with(api.clone());

    let (state, effects) = update(
        AppState::new(),
        Msg::ListOpened {
            source: ListSource::Public,
            page: 1,
            per_page: 10,
        },
    );
    assert!(state.is_loading());
    let Some(Effect::LoadList {
        token,
        source,
        page,
        per_page,
    }) = effects.into_iter().next()
    else {
        panic!("expected a list load");
    };
    engine.submit(EngineCommand::LoadList {
        token,
        source,
        page,
        per_page,
    });

    let (loaded_token, result) = wait_for(&engine, |event| match event {
        EngineEvent::ListLoaded { token, result } => Some((token, result)),
        _ => None,
    });
    assert_eq!(api.count("list_public:1:10"), 1);
    assert_eq!(api.count("get:"), 10);
    let gists = result.unwrap();
    assert!(gists
        .iter()
        .all(|g| g.first_file().unwrap().content.as_deref() == Some("code main.rs")));

    let (state, _) = update(
        state,
        Msg::ListLoaded {
            token: loaded_token,
            result: Ok(gists),
        },
    );
    assert!(!state.is_loading());
    assert_eq!(state.view().rows.len(), 10);
    assert!(engine.recv_timeout(Duration::from_millis(100)).is_none());
}

#[test]
fn cancelled_load_reports_nothing() {
    let api = public_fixture(3);
    let engine = engine_with(api.clone());

    engine.submit(EngineCommand::LoadList {
        token: 7,
        source: ListSource::Public,
        page: 1,
        per_page: 10,
    });
    engine.submit(EngineCommand::Cancel { token: 7 });

    assert!(engine.recv_timeout(Duration::from_millis(300)).is_none());
}

#[test]
fn newer_load_supersedes_older_one() {
    let api = public_fixture(2);
    api.serve(with_content(gist("d1", vec![file("x.txt", None)]), "detail"));
    let engine = engine_with(api.clone());

    engine.submit(EngineCommand::LoadList {
        token: 1,
        source: ListSource::Public,
        page: 1,
        per_page: 10,
    });
    engine.submit(EngineCommand::LoadDetail {
        token: 2,
        gist_id: "d1".to_string(),
    });

    let event = wait_for(&engine, Some);
    match event {
        EngineEvent::DetailLoaded { token, result } => {
            assert_eq!(token, 2);
            assert_eq!(result.unwrap().id, "d1");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(engine.recv_timeout(Duration::from_millis(200)).is_none());
}

#[test]
fn star_publishes_snapshot_and_reports_outcome() {
    let api = public_fixture(1);
    let engine = engine_with(api.clone());

    engine.submit(EngineCommand::Star {
        gist_id: "g0".to_string(),
    });

    let mut snapshot = None;
    let mut outcome = None;
    while snapshot.is_none() || outcome.is_none() {
        match wait_for(&engine, Some) {
            EngineEvent::StarredChanged(published) => snapshot = Some(published),
            EngineEvent::MutationFinished { action, result, .. } => outcome = Some((action, result)),
            _ => {}
        }
    }

    let snapshot = snapshot.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "g0");
    let (action, result) = outcome.unwrap();
    assert_eq!(action, Action::Star);
    assert_eq!(result.unwrap(), MutationOutcome::Applied);
}

#[test]
fn fork_publishes_source_ids() {
    let api = public_fixture(1);
    let engine = engine_with(api.clone());

    engine.submit(EngineCommand::Fork {
        gist_id: "g0".to_string(),
    });

    let sources = wait_for(&engine, |event| match event {
        EngineEvent::ForkedChanged(sources) => Some(sources),
        _ => None,
    });
    assert_eq!(sources.to_vec(), vec!["g0".to_string()]);
}

#[test]
fn search_terms_settle_after_the_quiet_period() {
    let api = Arc::new(FakeApi::default());
    let engine = engine_with(api);

    assert!(engine.publish_search_term("t"));
    assert!(engine.publish_search_term("to"));
    assert!(engine.publish_search_term("tok"));
    assert!(!engine.publish_search_term("tok"));

    let settled = wait_for(&engine, |event| match event {
        EngineEvent::SearchSettled(term) => Some(term),
        _ => None,
    });
    assert_eq!(settled, "tok");
    assert!(engine.recv_timeout(Duration::from_millis(150)).is_none());
}

#[test]
fn session_start_effects_verify_user_and_load_owned() {
    let api = Arc::new(FakeApi::default());
    api.mine
        .lock()
        .unwrap()
        .push(gist("mine-1", vec![file("a.txt", None)]));
    let engine = engine_with(api.clone());

    engine.submit(EngineCommand::VerifyUser);
    let user = wait_for(&engine, |event| match event {
        EngineEvent::UserVerified(result) => Some(result),
        _ => None,
    });
    assert_eq!(user.unwrap().login, "octocat");

    engine.submit(EngineCommand::LoadOwned);
    let owned = wait_for(&engine, |event| match event {
        EngineEvent::OwnedLoaded(result) => Some(result),
        _ => None,
    });
    assert_eq!(owned.unwrap(), vec!["mine-1".to_string()]);
}
