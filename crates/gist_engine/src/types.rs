use gist_core::{
    Action, CurrentUser, FailureKind, Gist, GistId, MutationOutcome, ViewToken,
};

use crate::store::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UserVerified(Result<CurrentUser, ApiError>),
    StarredChanged(Snapshot<Gist>),
    StarredLoadFailed(ApiError),
    /// Source ids of every gist forked during this session.
    ForkedChanged(Snapshot<GistId>),
    OwnedLoaded(Result<Vec<GistId>, ApiError>),
    ListLoaded {
        token: ViewToken,
        result: Result<Vec<Gist>, ApiError>,
    },
    DetailLoaded {
        token: ViewToken,
        result: Result<Gist, ApiError>,
    },
    MutationFinished {
        action: Action,
        gist_id: GistId,
        result: Result<MutationOutcome, ApiError>,
    },
    Created(Result<Gist, ApiError>),
    /// The search term stayed unchanged for the debounce window.
    SearchSettled(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Maps a non-success HTTP status onto the failure taxonomy.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 => FailureKind::Unauthorized,
            404 => FailureKind::NotFound,
            400 | 422 => FailureKind::Validation,
            500..=599 => FailureKind::Server(status),
            _ => FailureKind::HttpStatus(status),
        };
        Self::new(kind, message)
    }

    /// Network trouble, timeouts and 5xx answers are worth one more try.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            FailureKind::Network | FailureKind::Timeout | FailureKind::Server(_)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build api client: {0}")]
    Client(#[from] ApiError),
}
