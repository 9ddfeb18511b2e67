use std::collections::HashMap;
use std::future::Future;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use gist_core::{Action, Gist, GistId, ListSource, NewGist, ViewToken};
use gist_logging::{gist_debug, gist_info, gist_warn};
use tokio::sync::mpsc as async_mpsc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::content::{resolve_all_files, resolve_first_files};
use crate::search_bus::{next_settled, SearchTermBus, DEFAULT_DEBOUNCE};
use crate::store::{source_ids, ForkedStore, StarredStore};
use crate::{ApiError, ApiSettings, EngineError, EngineEvent, GistApi, ReqwestGistApi};

/// Page size used when collecting the ids of the user's own gists.
const OWNED_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
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
    Cancel {
        token: ViewToken,
    },
    Star {
        gist_id: GistId,
    },
    Unstar {
        gist_id: GistId,
    },
    Fork {
        gist_id: GistId,
    },
    Create(NewGist),
}

/// Runs remote work on a dedicated single-threaded runtime and reports back through events.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    search: SearchTermBus,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestGistApi::new(settings)?);
        Self::with_api(api, DEFAULT_DEBOUNCE)
    }

    pub fn with_api(api: Arc<dyn GistApi>, debounce: Duration) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let search = SearchTermBus::new();
        let search_rx = search.subscribe();

        thread::Builder::new()
            .name("gist-engine".to_string())
            .spawn(move || {
                runtime.block_on(run(api, cmd_rx, event_tx, search_rx, debounce));
                gist_debug!("engine runtime stopped");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            search,
        })
    }

    pub fn submit(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            gist_warn!("engine is gone, command dropped");
        }
    }

    /// Feeds the debounced search term; settled terms arrive as [`EngineEvent::SearchSettled`].
    pub fn publish_search_term(&self, term: impl Into<String>) -> bool {
        self.search.publish(term)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct Context {
    api: Arc<dyn GistApi>,
    starred: StarredStore,
    forked: ForkedStore,
    events: mpsc::Sender<EngineEvent>,
}

impl Context {
    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    async fn load_list(
        &self,
        source: &ListSource,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Gist>, ApiError> {
        let gists = match source {
            ListSource::Public => self.api.list_public(page, per_page).await?,
            ListSource::Mine => self.api.list_mine(page, per_page).await?,
            ListSource::Starred => self.starred.load().await?.to_vec(),
            ListSource::Search(query) => self.api.search(query, page, per_page).await?.items,
        };
        gist_info!("{} list: {} gists on page {page}", source.label(), gists.len());
        Ok(resolve_first_files(self.api.as_ref(), gists).await)
    }

    async fn load_detail(&self, gist_id: &str) -> Result<Gist, ApiError> {
        let gist = self.api.get(gist_id).await?;
        Ok(resolve_all_files(self.api.as_ref(), gist).await)
    }
}

async fn run(
    api: Arc<dyn GistApi>,
    mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>,
    events: mpsc::Sender<EngineEvent>,
    search_rx: watch::Receiver<String>,
    debounce: Duration,
) {
    let ctx = Arc::new(Context {
        starred: StarredStore::new(api.clone()),
        forked: ForkedStore::new(api.clone()),
        api,
        events,
    });
    spawn_forwarders(&ctx, search_rx, debounce);

    let mut loads: HashMap<ViewToken, CancellationToken> = HashMap::new();
    while let Some(command) = cmd_rx.recv().await {
        gist_debug!("engine command {command:?}");
        match command {
            EngineCommand::VerifyUser => spawn(&ctx, |ctx| async move {
                ctx.emit(EngineEvent::UserVerified(ctx.api.current_user().await));
            }),
            EngineCommand::RefreshStarred => spawn(&ctx, |ctx| async move {
                if let Err(err) = ctx.starred.load().await {
                    ctx.emit(EngineEvent::StarredLoadFailed(err));
                }
            }),
            EngineCommand::LoadOwned => spawn(&ctx, |ctx| async move {
                let result = ctx
                    .api
                    .list_mine(1, OWNED_PAGE_SIZE)
                    .await
                    .map(|gists| gists.into_iter().map(|gist| gist.id).collect());
                ctx.emit(EngineEvent::OwnedLoaded(result));
            }),
            EngineCommand::LoadList {
                token,
                source,
                page,
                per_page,
            } => {
                let cancel = begin_load(&mut loads, token);
                spawn(&ctx, |ctx| async move {
                    tokio::select! {
                        _ = cancel.cancelled() => gist_debug!("list load {token} cancelled"),
                        result = ctx.load_list(&source, page, per_page) => {
                            ctx.emit(EngineEvent::ListLoaded { token, result });
                        }
                    }
                });
            }
            EngineCommand::LoadDetail { token, gist_id } => {
                let cancel = begin_load(&mut loads, token);
                spawn(&ctx, |ctx| async move {
                    tokio::select! {
                        _ = cancel.cancelled() => gist_debug!("detail load {token} cancelled"),
                        result = ctx.load_detail(&gist_id) => {
                            ctx.emit(EngineEvent::DetailLoaded { token, result });
                        }
                    }
                });
            }
            EngineCommand::Cancel { token } => {
                if let Some(cancel) = loads.remove(&token) {
                    cancel.cancel();
                }
            }
            EngineCommand::Star { gist_id } => spawn(&ctx, |ctx| async move {
                let result = ctx.starred.star(&gist_id).await;
                ctx.emit(EngineEvent::MutationFinished {
                    action: Action::Star,
                    gist_id,
                    result,
                });
            }),
            EngineCommand::Unstar { gist_id } => spawn(&ctx, |ctx| async move {
                let result = ctx.starred.unstar(&gist_id).await;
                ctx.emit(EngineEvent::MutationFinished {
                    action: Action::Unstar,
                    gist_id,
                    result,
                });
            }),
            EngineCommand::Fork { gist_id } => spawn(&ctx, |ctx| async move {
                let result = ctx.forked.fork(&gist_id).await;
                ctx.emit(EngineEvent::MutationFinished {
                    action: Action::Fork,
                    gist_id,
                    result,
                });
            }),
            EngineCommand::Create(gist) => spawn(&ctx, |ctx| async move {
                let result = ctx.api.create(&gist).await;
                if let Ok(created) = &result {
                    gist_info!("created gist {}", created.id);
                }
                ctx.emit(EngineEvent::Created(result));
            }),
        }
    }
}

fn spawn<F, Fut>(ctx: &Arc<Context>, job: F)
where
    F: FnOnce(Arc<Context>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(job(ctx.clone()));
}

/// Registers a load for `token`. Only one view is live, so older loads are cancelled.
fn begin_load(
    loads: &mut HashMap<ViewToken, CancellationToken>,
    token: ViewToken,
) -> CancellationToken {
    for (stale, cancel) in loads.drain() {
        gist_debug!("superseding load {stale}");
        cancel.cancel();
    }
    let cancel = CancellationToken::new();
    loads.insert(token, cancel.clone());
    cancel
}

/// Turns store snapshots and settled search terms into events.
fn spawn_forwarders(ctx: &Arc<Context>, mut search_rx: watch::Receiver<String>, debounce: Duration) {
    let mut starred_rx = ctx.starred.subscribe();
    let events = ctx.events.clone();
    tokio::spawn(async move {
        while starred_rx.changed().await.is_ok() {
            let snapshot = starred_rx.borrow_and_update().clone();
            if events.send(EngineEvent::StarredChanged(snapshot)).is_err() {
                break;
            }
        }
    });

    let mut forked_rx = ctx.forked.subscribe();
    let events = ctx.events.clone();
    tokio::spawn(async move {
        while forked_rx.changed().await.is_ok() {
            let sources = source_ids(&forked_rx.borrow_and_update());
            if events.send(EngineEvent::ForkedChanged(sources)).is_err() {
                break;
            }
        }
    });

    let events = ctx.events.clone();
    tokio::spawn(async move {
        let mut last = String::new();
        while let Some(term) = next_settled(&mut search_rx, debounce, &last).await {
            last.clone_from(&term);
            if events.send(EngineEvent::SearchSettled(term)).is_err() {
                break;
            }
        }
    });
}
