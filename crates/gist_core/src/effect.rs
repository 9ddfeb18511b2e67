use crate::{GistId, ListSource, NewGist, ViewToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    VerifyUser,
    RefreshStarred,
    LoadOwned,
    LoadList {
        token: ViewToken,
        source: ListSource,
        page: u32,
        per_page: u32,
    },
    LoadDetail {
        token: ViewToken,
        gist_id: GistId,
    },
    /// Abandon whatever is still in flight for a view that went away.
    CancelLoad { token: ViewToken },
    Star { gist_id: GistId },
    Unstar { gist_id: GistId },
    Fork { gist_id: GistId },
    CreateGist(NewGist),
}
