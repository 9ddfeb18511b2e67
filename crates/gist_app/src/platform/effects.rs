use std::time::Duration;

use gist_core::{Effect, Msg};
use gist_engine::{ApiError, EngineCommand, EngineEvent, EngineHandle};
use gist_logging::{gist_debug, gist_warn};

/// Hands effects to the engine and turns its events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            gist_debug!("effect {}", effect_label(&effect));
            self.engine.submit(command_for(effect));
        }
    }

    pub fn publish_search_term(&self, term: &str) {
        self.engine.publish_search_term(term);
    }

    /// Next message from the engine, waiting at most `timeout`.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(msg_for)
    }
}

fn command_for(effect: Effect) -> EngineCommand {
    match effect {
        Effect::VerifyUser => EngineCommand::VerifyUser,
        Effect::RefreshStarred => EngineCommand::RefreshStarred,
        Effect::LoadOwned => EngineCommand::LoadOwned,
        Effect::LoadList {
            token,
            source,
            page,
            per_page,
        } => EngineCommand::LoadList {
            token,
            source,
            page,
            per_page,
        },
        Effect::LoadDetail { token, gist_id } => EngineCommand::LoadDetail { token, gist_id },
        Effect::CancelLoad { token } => EngineCommand::Cancel { token },
        Effect::Star { gist_id } => EngineCommand::Star { gist_id },
        Effect::Unstar { gist_id } => EngineCommand::Unstar { gist_id },
        Effect::Fork { gist_id } => EngineCommand::Fork { gist_id },
        Effect::CreateGist(gist) => EngineCommand::Create(gist),
    }
}

fn msg_for(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UserVerified(result) => Msg::UserVerified(result.map_err(failure)),
        EngineEvent::StarredChanged(snapshot) => Msg::StarredChanged(snapshot),
        EngineEvent::StarredLoadFailed(err) => Msg::StarredLoadFailed(failure(err)),
        EngineEvent::ForkedChanged(sources) => Msg::ForkedChanged(sources),
        EngineEvent::OwnedLoaded(result) => Msg::OwnedLoaded(result.map_err(failure)),
        EngineEvent::ListLoaded { token, result } => Msg::ListLoaded {
            token,
            result: result.map_err(failure),
        },
        EngineEvent::DetailLoaded { token, result } => Msg::DetailLoaded {
            token,
            result: result.map_err(failure),
        },
        EngineEvent::MutationFinished {
            action,
            gist_id,
            result,
        } => Msg::MutationFinished {
            action,
            gist_id,
            result: result.map_err(failure),
        },
        EngineEvent::Created(result) => Msg::CreateFinished(result.map_err(failure)),
        EngineEvent::SearchSettled(term) => Msg::SearchTermChanged(term),
    }
}

fn failure(err: ApiError) -> gist_core::FailureKind {
    gist_warn!("remote call failed: {err}");
    err.kind
}

/// Short name for logging; file contents of a create stay out of the log.
fn effect_label(effect: &Effect) -> &'static str {
    match effect {
        Effect::VerifyUser => "verify-user",
        Effect::RefreshStarred => "refresh-starred",
        Effect::LoadOwned => "load-owned",
        Effect::LoadList { .. } => "load-list",
        Effect::LoadDetail { .. } => "load-detail",
        Effect::CancelLoad { .. } => "cancel-load",
        Effect::Star { .. } => "star",
        Effect::Unstar { .. } => "unstar",
        Effect::Fork { .. } => "fork",
        Effect::CreateGist(_) => "create",
    }
}
