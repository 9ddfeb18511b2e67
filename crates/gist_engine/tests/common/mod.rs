#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, Once};
use std::time::Duration;

use gist_core::{CurrentUser, FailureKind, Gist, GistFile, NewGist, Owner, SearchPage};
use gist_engine::{ApiError, GistApi};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(gist_logging::initialize_for_tests);
}

pub fn file(name: &str, raw_url: Option<&str>) -> GistFile {
    GistFile {
        filename: name.to_string(),
        mime_type: Some("text/plain".to_string()),
        language: None,
        raw_url: raw_url.map(ToOwned::to_owned),
        size: 0,
        content: None,
    }
}

pub fn gist(id: &str, files: Vec<GistFile>) -> Gist {
    Gist {
        id: id.to_string(),
        description: Some(format!("gist {id}")),
        public: true,
        html_url: Some(format!("https://gist.example.com/{id}")),
        owner: Some(Owner {
            login: "octocat".to_string(),
            avatar_url: String::new(),
        }),
        updated_at: Some("2024-05-01T10:00:00Z".to_string()),
        files: files
            .into_iter()
            .map(|f| (f.filename.clone(), f))
            .collect(),
    }
}

pub fn with_content(mut gist: Gist, content: &str) -> Gist {
    for file in gist.files.values_mut() {
        file.content = Some(format!("{content} {}", file.filename));
    }
    gist
}

pub fn network_error() -> ApiError {
    ApiError::new(FailureKind::Network, "connection reset")
}

/// In-memory `GistApi` that records every call it receives.
#[derive(Default)]
pub struct FakeApi {
    /// Full gists served by `get`, contents included.
    pub gists: Mutex<HashMap<String, Gist>>,
    pub public: Mutex<Vec<Gist>>,
    pub mine: Mutex<Vec<Gist>>,
    pub starred: Mutex<Vec<String>>,
    pub raw: Mutex<HashMap<String, String>>,
    pub failing_gets: Mutex<HashSet<String>>,
    pub failing_raw: Mutex<HashSet<String>>,
    pub star_failure: Mutex<Option<ApiError>>,
    pub calls: Mutex<Vec<String>>,
    pub delay: Duration,
}

impl FakeApi {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn serve(&self, gist: Gist) {
        self.gists.lock().unwrap().insert(gist.id.clone(), gist);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait::async_trait]
impl GistApi for FakeApi {
    async fn list_public(&self, page: u32, per_page: u32) -> Result<Vec<Gist>, ApiError> {
        self.record(format!("list_public:{page}:{per_page}"));
        self.pause().await;
        Ok(self.public.lock().unwrap().clone())
    }

    async fn list_mine(&self, page: u32, per_page: u32) -> Result<Vec<Gist>, ApiError> {
        self.record(format!("list_mine:{page}:{per_page}"));
        Ok(self.mine.lock().unwrap().clone())
    }

    async fn list_starred(&self) -> Result<Vec<Gist>, ApiError> {
        self.record("list_starred".to_string());
        let ids = self.starred.lock().unwrap().clone();
        let gists = self.gists.lock().unwrap();
        Ok(ids.iter().filter_map(|id| gists.get(id).cloned()).collect())
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, ApiError> {
        self.record(format!("search:{query}:{page}:{per_page}"));
        Ok(SearchPage {
            total_count: 0,
            incomplete_results: false,
            items: Vec::new(),
        })
    }

    async fn get(&self, gist_id: &str) -> Result<Gist, ApiError> {
        self.record(format!("get:{gist_id}"));
        self.pause().await;
        if self.failing_gets.lock().unwrap().contains(gist_id) {
            return Err(network_error());
        }
        self.gists
            .lock()
            .unwrap()
            .get(gist_id)
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, "Not Found"))
    }

    async fn create(&self, new_gist: &NewGist) -> Result<Gist, ApiError> {
        self.record("create".to_string());
        let files = new_gist.files.keys().map(|name| file(name, None)).collect();
        Ok(gist("created", files))
    }

    async fn fork(&self, gist_id: &str) -> Result<Gist, ApiError> {
        self.record(format!("fork:{gist_id}"));
        if !self.gists.lock().unwrap().contains_key(gist_id) {
            return Err(ApiError::from_status(404, "Not Found"));
        }
        Ok(gist(&format!("fork-of-{gist_id}"), Vec::new()))
    }

    async fn star(&self, gist_id: &str) -> Result<(), ApiError> {
        self.record(format!("star:{gist_id}"));
        self.pause().await;
        if let Some(err) = self.star_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let mut starred = self.starred.lock().unwrap();
        if !starred.iter().any(|id| id == gist_id) {
            starred.push(gist_id.to_string());
        }
        Ok(())
    }

    async fn unstar(&self, gist_id: &str) -> Result<(), ApiError> {
        self.record(format!("unstar:{gist_id}"));
        self.pause().await;
        self.starred.lock().unwrap().retain(|id| id != gist_id);
        Ok(())
    }

    async fn raw_content(&self, raw_url: &str) -> Result<String, ApiError> {
        self.record(format!("raw:{raw_url}"));
        self.pause().await;
        if self.failing_raw.lock().unwrap().contains(raw_url) {
            return Err(ApiError::from_status(503, "Service Unavailable"));
        }
        self.raw
            .lock()
            .unwrap()
            .get(raw_url)
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, "Not Found"))
    }

    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.record("current_user".to_string());
        Ok(CurrentUser {
            login: "octocat".to_string(),
            avatar_url: String::new(),
            html_url: None,
        })
    }
}
