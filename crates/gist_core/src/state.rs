use std::collections::BTreeSet;
use std::sync::Arc;

use crate::view_model::{AppViewModel, DetailView, DraftView, FileView, GistRowView, ScreenView};
use crate::{
    display_language, filter_gists, paginate, Action, CurrentUser, FailureKind, Gist, GistDraft,
    GistId, Notice, PageRequest,
};

/// Identifies one opened view instance; results for older tokens are stale.
pub type ViewToken = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    Public,
    Mine,
    Starred,
    Search(String),
}

impl ListSource {
    /// The starred list is fetched whole and sliced locally; the others page on the server.
    pub fn pages_on_server(&self) -> bool {
        !matches!(self, ListSource::Starred)
    }

    pub fn label(&self) -> &str {
        match self {
            ListSource::Public => "public",
            ListSource::Mine => "mine",
            ListSource::Starred => "starred",
            ListSource::Search(query) => query,
        }
    }

    pub fn load_action(&self) -> Action {
        match self {
            ListSource::Public => Action::LoadPublic,
            ListSource::Mine => Action::LoadMine,
            ListSource::Starred => Action::LoadStarred,
            ListSource::Search(_) => Action::Search,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    List(ListSource),
    Detail(GistId),
    Create,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ViewState {
    pub(crate) token: ViewToken,
    pub(crate) screen: Screen,
    pub(crate) loading: bool,
    pub(crate) page: PageRequest,
    pub(crate) gists: Vec<Gist>,
    pub(crate) detail: Option<Gist>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    last_token: ViewToken,
    view: Option<ViewState>,
    search_term: String,
    starred: Option<Arc<[Gist]>>,
    forked: BTreeSet<GistId>,
    owned: BTreeSet<GistId>,
    current_user: Option<CurrentUser>,
    draft: GistDraft,
    creating: bool,
    last_created: Option<Gist>,
    notices: Vec<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            screen: self.view.as_ref().map(|view| match &view.screen {
                Screen::List(source) => ScreenView::List(source.clone()),
                Screen::Detail(id) => ScreenView::Detail(id.clone()),
                Screen::Create => ScreenView::Create,
            }),
            loading: self.view.as_ref().is_some_and(|view| view.loading),
            search_term: self.search_term.clone(),
            rows: self.visible_rows(),
            total: self.filtered_total(),
            page: self.view.as_ref().map(|view| view.page).unwrap_or_default(),
            detail: self.detail_view(),
            draft: DraftView {
                draft: self.draft.clone(),
                submitting: self.creating,
                last_created: self.last_created.as_ref().map(|gist| gist.id.clone()),
            },
            user: self.current_user.as_ref().map(|user| user.login.clone()),
            starred_loaded: self.starred.is_some(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Notices accumulated since the last call, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.view.as_ref().map(|view| &view.screen)
    }

    pub fn current_token(&self) -> Option<ViewToken> {
        self.view.as_ref().map(|view| view.token)
    }

    pub fn is_loading(&self) -> bool {
        self.view.as_ref().is_some_and(|view| view.loading)
    }

    pub fn is_starred(&self, gist_id: &str) -> bool {
        self.starred
            .as_deref()
            .is_some_and(|starred| starred.iter().any(|gist| gist.id == gist_id))
    }

    pub fn is_forked(&self, gist_id: &str) -> bool {
        self.forked.contains(gist_id)
    }

    pub fn is_owned(&self, gist_id: &str) -> bool {
        self.owned.contains(gist_id)
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
        self.dirty = true;
    }

    /// Replaces the current view with a fresh instance and returns its token.
    pub(crate) fn open_view(&mut self, screen: Screen, page: PageRequest, loading: bool) -> ViewToken {
        self.last_token += 1;
        self.view = Some(ViewState {
            token: self.last_token,
            screen,
            loading,
            page,
            gists: Vec::new(),
            detail: None,
        });
        self.dirty = true;
        self.last_token
    }

    /// Starts a new load for the current view, keeping what is displayed.
    pub(crate) fn restart_load(&mut self, page: PageRequest) -> Option<ViewToken> {
        self.last_token += 1;
        let token = self.last_token;
        let view = self.view.as_mut()?;
        view.token = token;
        view.page = page;
        view.loading = true;
        self.dirty = true;
        Some(token)
    }

    pub(crate) fn close_view(&mut self) -> Option<ViewState> {
        let closed = self.view.take();
        if closed.is_some() {
            self.dirty = true;
        }
        closed
    }

    pub(crate) fn view_mut(&mut self) -> Option<&mut ViewState> {
        self.view.as_mut()
    }

    /// Returns the live view only when `token` is its current token.
    pub(crate) fn view_for_token(&mut self, token: ViewToken) -> Option<&mut ViewState> {
        self.view.as_mut().filter(|view| view.token == token)
    }

    pub(crate) fn set_search_term(&mut self, term: String) -> bool {
        if self.search_term == term {
            return false;
        }
        self.search_term = term;
        self.dirty = true;
        true
    }

    pub(crate) fn set_starred(&mut self, snapshot: Arc<[Gist]>) {
        if let Some(view) = self.view.as_mut() {
            if view.screen == Screen::List(ListSource::Starred) {
                sync_with_snapshot(&mut view.gists, &snapshot);
            }
        }
        self.starred = Some(snapshot);
        self.dirty = true;
    }

    pub(crate) fn set_forked(&mut self, sources: &[GistId]) {
        self.forked = sources.iter().cloned().collect();
        self.dirty = true;
    }

    pub(crate) fn set_owned(&mut self, ids: Vec<GistId>) {
        self.owned = ids.into_iter().collect();
        self.dirty = true;
    }

    pub(crate) fn set_current_user(&mut self, user: CurrentUser) {
        self.current_user = Some(user);
        self.dirty = true;
    }

    pub(crate) fn set_draft(&mut self, draft: GistDraft) {
        self.draft = draft;
        self.dirty = true;
    }

    pub(crate) fn draft(&self) -> &GistDraft {
        &self.draft
    }

    pub(crate) fn set_creating(&mut self, creating: bool) {
        self.creating = creating;
        self.dirty = true;
    }

    pub(crate) fn record_created(&mut self, gist: Gist) {
        self.owned.insert(gist.id.clone());
        self.draft = GistDraft::default();
        self.last_created = Some(gist);
        self.dirty = true;
    }

    pub(crate) fn fail_load(&mut self, token: ViewToken, action: Action, kind: FailureKind) {
        if let Some(view) = self.view_for_token(token) {
            view.loading = false;
            self.push_notice(Notice::failure(action, kind));
        }
    }

    fn filtered(&self) -> Vec<&Gist> {
        match &self.view {
            Some(view) if matches!(view.screen, Screen::List(_)) => {
                filter_gists(&view.gists, &self.search_term)
            }
            _ => Vec::new(),
        }
    }

    fn filtered_total(&self) -> usize {
        self.filtered().len()
    }

    fn visible_rows(&self) -> Vec<GistRowView> {
        let Some(view) = &self.view else {
            return Vec::new();
        };
        let filtered = self.filtered();
        let visible: &[&Gist] = match &view.screen {
            Screen::List(source) if !source.pages_on_server() => paginate(&filtered, view.page),
            _ => &filtered,
        };
        visible.iter().map(|gist| self.row_view(gist)).collect()
    }

    fn row_view(&self, gist: &Gist) -> GistRowView {
        let first = gist.first_file();
        GistRowView {
            id: gist.id.clone(),
            description: gist.description_text().to_string(),
            owner: gist.owner_login().map(ToOwned::to_owned),
            public: gist.public,
            updated_at: gist.updated_at.clone(),
            file_count: gist.files.len(),
            first_file: first.map(|file| file.filename.clone()),
            language: first.map(display_language),
            preview: first.and_then(|file| file.content.clone()),
            starred: self.is_starred(&gist.id),
            forked: self.is_forked(&gist.id),
            owned: self.is_owned(&gist.id),
        }
    }

    fn detail_view(&self) -> Option<DetailView> {
        let view = self.view.as_ref()?;
        let gist = view.detail.as_ref()?;
        let owned = self.is_owned(&gist.id);
        let forked = self.is_forked(&gist.id);
        Some(DetailView {
            id: gist.id.clone(),
            description: gist.description_text().to_string(),
            owner: gist.owner_login().map(ToOwned::to_owned),
            html_url: gist.html_url.clone(),
            public: gist.public,
            updated_at: gist.updated_at.clone(),
            files: gist
                .files
                .values()
                .map(|file| FileView {
                    filename: file.filename.clone(),
                    language: display_language(file),
                    size: file.size,
                    content: file.content.clone(),
                })
                .collect(),
            starred: self.is_starred(&gist.id),
            forked,
            owned,
            can_fork: !owned && !forked,
        })
    }
}

/// Keeps fetched entries that are still starred and appends newly starred ones.
fn sync_with_snapshot(gists: &mut Vec<Gist>, snapshot: &[Gist]) {
    gists.retain(|gist| snapshot.iter().any(|starred| starred.id == gist.id));
    for starred in snapshot {
        if !gists.iter().any(|gist| gist.id == starred.id) {
            gists.push(starred.clone());
        }
    }
}
