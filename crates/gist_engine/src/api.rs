use gist_core::{CurrentUser, Gist, NewGist, SearchPage};

use crate::ApiError;

/// Remote gist operations. Every call is retried once on transient failure.
#[async_trait::async_trait]
pub trait GistApi: Send + Sync {
    async fn list_public(&self, page: u32, per_page: u32) -> Result<Vec<Gist>, ApiError>;

    async fn list_mine(&self, page: u32, per_page: u32) -> Result<Vec<Gist>, ApiError>;

    /// The whole starred collection in one response.
    async fn list_starred(&self) -> Result<Vec<Gist>, ApiError>;

    async fn search(&self, query: &str, page: u32, per_page: u32)
        -> Result<SearchPage, ApiError>;

    async fn get(&self, gist_id: &str) -> Result<Gist, ApiError>;

    async fn create(&self, gist: &NewGist) -> Result<Gist, ApiError>;

    async fn fork(&self, gist_id: &str) -> Result<Gist, ApiError>;

    async fn star(&self, gist_id: &str) -> Result<(), ApiError>;

    async fn unstar(&self, gist_id: &str) -> Result<(), ApiError>;

    /// Downloads and decodes the raw text behind a file's `raw_url`.
    async fn raw_content(&self, raw_url: &str) -> Result<String, ApiError>;

    async fn current_user(&self) -> Result<CurrentUser, ApiError>;
}
