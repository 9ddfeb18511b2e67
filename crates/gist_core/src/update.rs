use crate::state::Screen;
use crate::{Action, AppState, Effect, Msg, MutationOutcome, Notice, PageRequest, Severity};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionStarted => vec![Effect::VerifyUser, Effect::RefreshStarred, Effect::LoadOwned],
        Msg::ListOpened {
            source,
            page,
            per_page,
        } => {
            let mut effects = cancel_current(&state);
            let page = PageRequest::new(page, per_page);
            let token = state.open_view(Screen::List(source.clone()), page, true);
            effects.push(Effect::LoadList {
                token,
                source,
                page: page.page,
                per_page: page.per_page,
            });
            effects
        }
        Msg::DetailOpened { gist_id } => {
            let mut effects = cancel_current(&state);
            let token = state.open_view(
                Screen::Detail(gist_id.clone()),
                PageRequest::default(),
                true,
            );
            effects.push(Effect::LoadDetail { token, gist_id });
            effects
        }
        Msg::CreateOpened => {
            let effects = cancel_current(&state);
            state.open_view(Screen::Create, PageRequest::default(), false);
            effects
        }
        Msg::ViewClosed => {
            let effects = cancel_current(&state);
            state.close_view();
            effects
        }
        Msg::PageChanged(page) => change_page(&mut state, page),
        Msg::SearchTermChanged(term) => {
            if !state.set_search_term(term) {
                return (state, Vec::new());
            }
            // A new term always starts from the first page.
            change_page(&mut state, 1)
        }
        Msg::ListLoaded { token, result } => {
            let action = match state.screen() {
                Some(Screen::List(source)) => source.load_action(),
                _ => return (state, Vec::new()),
            };
            match result {
                Ok(gists) => {
                    if let Some(view) = state.view_for_token(token) {
                        view.gists = gists;
                        view.loading = false;
                        state.mark_dirty();
                    }
                }
                Err(kind) => state.fail_load(token, action, kind),
            }
            Vec::new()
        }
        Msg::DetailLoaded { token, result } => {
            match result {
                Ok(gist) => {
                    if let Some(view) = state.view_for_token(token) {
                        view.detail = Some(gist);
                        view.loading = false;
                        state.mark_dirty();
                    }
                }
                Err(kind) => state.fail_load(token, Action::LoadDetail, kind),
            }
            Vec::new()
        }
        Msg::StarredChanged(snapshot) => {
            state.set_starred(snapshot);
            Vec::new()
        }
        Msg::StarredLoadFailed(kind) => {
            state.push_notice(Notice::failure(Action::LoadStarred, kind));
            Vec::new()
        }
        Msg::ForkedChanged(sources) => {
            state.set_forked(&sources);
            Vec::new()
        }
        Msg::OwnedLoaded(result) => {
            // The owned set only refines status flags; a failure keeps the old set.
            if let Ok(ids) = result {
                state.set_owned(ids);
            }
            Vec::new()
        }
        Msg::UserVerified(result) => {
            match result {
                Ok(user) => state.set_current_user(user),
                Err(kind) => state.push_notice(Notice::failure(Action::VerifyUser, kind)),
            }
            Vec::new()
        }
        Msg::StarToggled { gist_id } => {
            if state.is_starred(&gist_id) {
                vec![Effect::Unstar { gist_id }]
            } else {
                vec![Effect::Star { gist_id }]
            }
        }
        Msg::ForkClicked { gist_id } => {
            if state.is_owned(&gist_id) {
                state.push_notice(Notice::new(
                    Severity::Warning,
                    "You cannot fork your own gist!",
                ));
                Vec::new()
            } else if state.is_forked(&gist_id) {
                Vec::new()
            } else {
                vec![Effect::Fork { gist_id }]
            }
        }
        Msg::MutationFinished { action, result, .. } => {
            match result {
                Ok(MutationOutcome::Applied) => {
                    if let Some(notice) = Notice::success(action) {
                        state.push_notice(notice);
                    }
                }
                Ok(MutationOutcome::Unchanged) => {}
                Ok(MutationOutcome::RemoteOnly) => state.push_notice(Notice::remote_only(action)),
                Err(kind) => state.push_notice(Notice::failure(action, kind)),
            }
            Vec::new()
        }
        Msg::DraftChanged(draft) => {
            state.set_draft(draft);
            Vec::new()
        }
        Msg::CreateSubmitted => {
            if state.is_creating() {
                return (state, Vec::new());
            }
            match state.draft().validate() {
                Ok(new_gist) => {
                    state.set_creating(true);
                    vec![Effect::CreateGist(new_gist)]
                }
                Err(_) => {
                    state.push_notice(Notice::new(
                        Severity::Error,
                        "Please fix errors before submitting.",
                    ));
                    Vec::new()
                }
            }
        }
        Msg::CreateFinished(result) => {
            state.set_creating(false);
            match result {
                Ok(gist) => {
                    state.record_created(gist);
                    if let Some(notice) = Notice::success(Action::Create) {
                        state.push_notice(notice);
                    }
                }
                Err(kind) => state.push_notice(Notice::failure(Action::Create, kind)),
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn cancel_current(state: &AppState) -> Vec<Effect> {
    match state.current_token() {
        Some(token) if state.is_loading() => vec![Effect::CancelLoad { token }],
        _ => Vec::new(),
    }
}

fn change_page(state: &mut AppState, page: u32) -> Vec<Effect> {
    let (source, current) = match state.view_mut() {
        Some(view) => match &view.screen {
            Screen::List(source) => (source.clone(), view.page),
            _ => return Vec::new(),
        },
        None => return Vec::new(),
    };
    let next = PageRequest::new(page, current.per_page);

    if !source.pages_on_server() {
        if let Some(view) = state.view_mut() {
            view.page = next;
        }
        state.mark_dirty();
        return Vec::new();
    }
    if next == current {
        return Vec::new();
    }

    let mut effects = cancel_current(state);
    if let Some(token) = state.restart_load(next) {
        effects.push(Effect::LoadList {
            token,
            source,
            page: next.page,
            per_page: next.per_page,
        });
    }
    effects
}

