use std::sync::Arc;

use crate::{
    Action, CurrentUser, FailureKind, Gist, GistDraft, GistId, ListSource, MutationOutcome,
    ViewToken,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Application start: load the relation sets and verify the credential.
    SessionStarted,
    /// User opened a list view.
    ListOpened {
        source: ListSource,
        page: u32,
        per_page: u32,
    },
    /// User opened the detail view of one gist.
    DetailOpened { gist_id: GistId },
    /// User opened the create form.
    CreateOpened,
    /// User navigated away from the current view.
    ViewClosed,
    /// User picked another page of the current list.
    PageChanged(u32),
    /// Process-wide search term changed (already debounced).
    SearchTermChanged(String),
    /// Engine finished a list load, content fan-out included.
    ListLoaded {
        token: ViewToken,
        result: Result<Vec<Gist>, FailureKind>,
    },
    /// Engine finished a detail load, content fan-out included.
    DetailLoaded {
        token: ViewToken,
        result: Result<Gist, FailureKind>,
    },
    /// Starred store published a new snapshot.
    StarredChanged(Arc<[Gist]>),
    /// Starred store failed its initial load.
    StarredLoadFailed(FailureKind),
    /// Forked store published a new snapshot (source gist ids).
    ForkedChanged(Arc<[GistId]>),
    /// The user's own gist ids were loaded.
    OwnedLoaded(Result<Vec<GistId>, FailureKind>),
    /// Credential check finished.
    UserVerified(Result<CurrentUser, FailureKind>),
    /// User clicked the star toggle of a gist.
    StarToggled { gist_id: GistId },
    /// User clicked fork on a gist.
    ForkClicked { gist_id: GistId },
    /// A star, unstar or fork finished.
    MutationFinished {
        action: Action,
        gist_id: GistId,
        result: Result<MutationOutcome, FailureKind>,
    },
    /// User edited the create form.
    DraftChanged(GistDraft),
    /// User submitted the create form.
    CreateSubmitted,
    /// Engine finished creating a gist.
    CreateFinished(Result<Gist, FailureKind>),
}
