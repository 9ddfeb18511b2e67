use std::sync::Arc;

use gist_core::{Gist, GistId, MutationOutcome};
use gist_logging::{gist_info, gist_warn};
use tokio::sync::{watch, Mutex, MutexGuard};

use crate::{ApiError, GistApi};

/// Immutable view of a relation set. Every change publishes a fresh value.
pub type Snapshot<E> = Arc<[E]>;

/// Something a relation set can hold, identified by a gist id.
pub trait RelationEntry: Clone + Send + Sync + 'static {
    fn key(&self) -> &str;
}

impl RelationEntry for Gist {
    fn key(&self) -> &str {
        &self.id
    }
}

/// A gist forked during this session, keyed by the gist it was forked from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkedGist {
    pub source_id: GistId,
    pub fork: Gist,
}

impl RelationEntry for ForkedGist {
    fn key(&self) -> &str {
        &self.source_id
    }
}

/// Snapshot holder with publish-on-change and replay of the latest value.
///
/// Mutations take the async `mutation` lock so that remote calls and the
/// snapshot updates that follow them apply in the order they were issued.
pub struct RelationSet<E: RelationEntry> {
    tx: watch::Sender<Snapshot<E>>,
    mutation: Mutex<()>,
}

impl<E: RelationEntry> Default for RelationSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RelationEntry> RelationSet<E> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot::<E>::from(Vec::new()));
        Self {
            tx,
            mutation: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Snapshot<E> {
        self.tx.borrow().clone()
    }

    /// A new subscriber sees the latest snapshot through `borrow` right away.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<E>> {
        self.tx.subscribe()
    }

    pub fn is_member(&self, key: &str) -> bool {
        self.tx.borrow().iter().any(|entry| entry.key() == key)
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().await
    }

    /// Publishes the current entries plus `entry`; returns false if the key was present.
    pub(crate) fn insert(&self, entry: E) -> bool {
        if self.is_member(entry.key()) {
            return false;
        }
        let mut next = self.snapshot().to_vec();
        next.push(entry);
        self.tx.send_replace(next.into());
        true
    }

    /// Publishes the current entries without `key`; returns false if it was absent.
    pub(crate) fn remove(&self, key: &str) -> bool {
        if !self.is_member(key) {
            return false;
        }
        let next: Vec<E> = self
            .snapshot()
            .iter()
            .filter(|entry| entry.key() != key)
            .cloned()
            .collect();
        self.tx.send_replace(next.into());
        true
    }

    /// Publishes `entries`, keeping the first entry for each key.
    pub(crate) fn replace_all(&self, entries: Vec<E>) {
        let mut next: Vec<E> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !next.iter().any(|kept| kept.key() == entry.key()) {
                next.push(entry);
            }
        }
        self.tx.send_replace(next.into());
    }
}

/// The user's starred gists, loaded eagerly and kept in sync with star/unstar.
pub struct StarredStore {
    api: Arc<dyn GistApi>,
    set: RelationSet<Gist>,
}

impl StarredStore {
    pub fn new(api: Arc<dyn GistApi>) -> Self {
        Self {
            api,
            set: RelationSet::new(),
        }
    }

    pub fn snapshot(&self) -> Snapshot<Gist> {
        self.set.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Gist>> {
        self.set.subscribe()
    }

    pub fn is_starred(&self, gist_id: &str) -> bool {
        self.set.is_member(gist_id)
    }

    /// Replaces the set with the remote starred collection.
    pub async fn load(&self) -> Result<Snapshot<Gist>, ApiError> {
        let _guard = self.set.lock().await;
        match self.api.list_starred().await {
            Ok(gists) => {
                gist_info!("loaded {} starred gists", gists.len());
                self.set.replace_all(gists);
                Ok(self.set.snapshot())
            }
            Err(err) => {
                gist_warn!("loading starred gists failed: {err}");
                Err(err)
            }
        }
    }

    /// Stars remotely, then fetches the gist to add it to the set.
    pub async fn star(&self, gist_id: &str) -> Result<MutationOutcome, ApiError> {
        let _guard = self.set.lock().await;
        self.api.star(gist_id).await?;
        if self.set.is_member(gist_id) {
            return Ok(MutationOutcome::Unchanged);
        }
        match self.api.get(gist_id).await {
            Ok(gist) => {
                self.set.insert(gist);
                gist_info!("starred gist {gist_id}");
                Ok(MutationOutcome::Applied)
            }
            Err(err) => {
                gist_warn!("starred gist {gist_id} but could not fetch it: {err}");
                Ok(MutationOutcome::RemoteOnly)
            }
        }
    }

    pub async fn unstar(&self, gist_id: &str) -> Result<MutationOutcome, ApiError> {
        let _guard = self.set.lock().await;
        self.api.unstar(gist_id).await?;
        gist_info!("unstarred gist {gist_id}");
        if self.set.remove(gist_id) {
            Ok(MutationOutcome::Applied)
        } else {
            Ok(MutationOutcome::Unchanged)
        }
    }
}

/// Gists forked during this session. Starts empty and is never loaded from remote.
pub struct ForkedStore {
    api: Arc<dyn GistApi>,
    set: RelationSet<ForkedGist>,
}

impl ForkedStore {
    pub fn new(api: Arc<dyn GistApi>) -> Self {
        Self {
            api,
            set: RelationSet::new(),
        }
    }

    pub fn snapshot(&self) -> Snapshot<ForkedGist> {
        self.set.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<ForkedGist>> {
        self.set.subscribe()
    }

    pub fn is_forked(&self, source_id: &str) -> bool {
        self.set.is_member(source_id)
    }

    pub fn forked_sources(&self) -> Snapshot<GistId> {
        source_ids(&self.set.snapshot())
    }

    /// Forks `source_id` unless this session already forked it.
    pub async fn fork(&self, source_id: &str) -> Result<MutationOutcome, ApiError> {
        let _guard = self.set.lock().await;
        if self.set.is_member(source_id) {
            return Ok(MutationOutcome::Unchanged);
        }
        let fork = self.api.fork(source_id).await?;
        gist_info!("forked gist {source_id} into {}", fork.id);
        self.set.insert(ForkedGist {
            source_id: source_id.to_string(),
            fork,
        });
        Ok(MutationOutcome::Applied)
    }
}

pub(crate) fn source_ids(entries: &[ForkedGist]) -> Snapshot<GistId> {
    entries
        .iter()
        .map(|entry| entry.source_id.clone())
        .collect::<Vec<_>>()
        .into()
}
