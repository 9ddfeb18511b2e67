//! Gist core: data model, client-side search and paging, and the pure view
//! state machine driven by `update`.
mod draft;
mod effect;
mod model;
mod msg;
mod notice;
mod paging;
mod search;
mod state;
mod update;
mod view_model;

pub use draft::{DraftError, DraftFile, GistDraft};
pub use effect::Effect;
pub use model::{
    CurrentUser, Gist, GistFile, GistFiles, GistId, NewGist, NewGistFile, Owner, SearchPage,
};
pub use msg::Msg;
pub use notice::{Action, FailureKind, MutationOutcome, Notice, Severity};
pub use paging::{page_count, paginate, PageRequest, DEFAULT_PER_PAGE};
pub use search::{filter_gists, matches_term};
pub use state::{AppState, ListSource, Screen, ViewToken};
pub use update::update;
pub use view_model::{
    display_language, ellipsis, language_for_filename, AppViewModel, DetailView, DraftView,
    FileView, GistRowView, ScreenView,
};
