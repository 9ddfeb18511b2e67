use std::time::Duration;

use futures_util::StreamExt;
use gist_core::{CurrentUser, FailureKind, Gist, NewGist, SearchPage};
use gist_logging::{gist_debug, gist_warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::decode::decode_text;
use crate::{ApiError, GistApi};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";
const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
/// Largest page the API hands out; the starred collection is walked with it.
const STARRED_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub api_version: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub max_content_bytes: u64,
    /// Upper bound on starred pages walked by `list_starred`.
    pub max_starred_pages: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: concat!("gist-client/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_retries: 1,
            retry_delay: Duration::from_millis(250),
            max_content_bytes: 5 * 1024 * 1024,
            max_starred_pages: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestGistApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestGistApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url).map_err(|err| {
            ApiError::new(
                FailureKind::Validation,
                format!("invalid base url {}: {err}", settings.base_url),
            )
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::new(FailureKind::Validation, "base url cannot carry a path")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Headers for a request to `url`. The credential only travels to the API
    /// origin: same scheme, host and port as the base url.
    fn headers_for(&self, url: &Url) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        headers.insert(API_VERSION_HEADER, header_value(&self.settings.api_version)?);
        headers.insert(USER_AGENT, header_value(&self.settings.user_agent)?);
        if let Some(token) = self.settings.token.as_deref().filter(|token| !token.is_empty()) {
            if url.origin() == self.base.origin() {
                headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
            }
        }
        Ok(headers)
    }

    fn request(&self, method: Method, url: &Url) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .request(method, url.clone())
            .headers(self.headers_for(url)?))
    }

    /// Sends the request built by `build`, retrying transient failures up to `max_retries` times.
    async fn execute<F>(&self, label: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> Result<RequestBuilder, ApiError>,
    {
        let mut attempt = 0;
        loop {
            gist_debug!("{label} (attempt {})", attempt + 1);
            let error = match build()?.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => error_from_response(response).await,
                Err(err) => map_reqwest_error(err),
            };
            if !error.is_transient() || attempt >= self.settings.max_retries {
                gist_warn!("{label} failed: {error}");
                return Err(error);
            }
            attempt += 1;
            gist_warn!(
                "{label} failed ({error}), retry {attempt}/{}",
                self.settings.max_retries
            );
            tokio::time::sleep(self.settings.retry_delay).await;
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let label = format!("GET {}", url.path());
        let response = self
            .execute(&label, || {
                Ok(self.request(Method::GET, &url)?.query(query))
            })
            .await?;
        read_json(response).await
    }

    async fn send_empty(&self, method: Method, url: Url) -> Result<(), ApiError> {
        let label = format!("{method} {}", url.path());
        self.execute(&label, || {
            // Content-Length: 0 is required for a body-less PUT.
            Ok(self.request(method.clone(), &url)?.body(Vec::<u8>::new()))
        })
        .await
        .map(|_| ())
    }

    async fn list_page(
        &self,
        segments: &[&str],
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Gist>, ApiError> {
        let url = self.endpoint(segments)?;
        self.get_json(url, &paging_query(page, per_page)).await
    }
}

#[async_trait::async_trait]
impl GistApi for ReqwestGistApi {
    async fn list_public(&self, page: u32, per_page: u32) -> Result<Vec<Gist>, ApiError> {
        self.list_page(&["gists", "public"], page, per_page).await
    }

    async fn list_mine(&self, page: u32, per_page: u32) -> Result<Vec<Gist>, ApiError> {
        self.list_page(&["gists"], page, per_page).await
    }

    async fn list_starred(&self) -> Result<Vec<Gist>, ApiError> {
        let max_pages = self.settings.max_starred_pages;
        let mut starred = Vec::new();
        for page in 1..=max_pages {
            let batch = self
                .list_page(&["gists", "starred"], page, STARRED_PAGE_SIZE)
                .await?;
            let last = batch.len() < STARRED_PAGE_SIZE as usize;
            starred.extend(batch);
            if last {
                return Ok(starred);
            }
        }
        gist_warn!(
            "starred gists truncated at {} entries ({max_pages} pages); membership may be incomplete",
            starred.len()
        );
        Ok(starred)
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, ApiError> {
        let url = self.endpoint(&["search", "gists"])?;
        let mut params = vec![("q", query.to_string())];
        params.extend(paging_query(page, per_page));
        self.get_json(url, &params).await
    }

    async fn get(&self, gist_id: &str) -> Result<Gist, ApiError> {
        let url = self.endpoint(&["gists", gist_id])?;
        self.get_json(url, &[]).await
    }

    async fn create(&self, gist: &NewGist) -> Result<Gist, ApiError> {
        let url = self.endpoint(&["gists"])?;
        let label = format!("POST {}", url.path());
        let response = self
            .execute(&label, || Ok(self.request(Method::POST, &url)?.json(gist)))
            .await?;
        read_json(response).await
    }

    async fn fork(&self, gist_id: &str) -> Result<Gist, ApiError> {
        let url = self.endpoint(&["gists", gist_id, "forks"])?;
        let label = format!("POST {}", url.path());
        let response = self
            .execute(&label, || {
                Ok(self.request(Method::POST, &url)?.body(Vec::<u8>::new()))
            })
            .await?;
        read_json(response).await
    }

    async fn star(&self, gist_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["gists", gist_id, "star"])?;
        self.send_empty(Method::PUT, url).await
    }

    async fn unstar(&self, gist_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["gists", gist_id, "star"])?;
        self.send_empty(Method::DELETE, url).await
    }

    async fn raw_content(&self, raw_url: &str) -> Result<String, ApiError> {
        let url = Url::parse(raw_url).map_err(|err| {
            ApiError::new(FailureKind::Validation, format!("invalid raw url: {err}"))
        })?;
        let label = format!("GET {}", url.path());
        let response = self
            .execute(&label, || self.request(Method::GET, &url))
            .await?;

        let max_bytes = self.settings.max_content_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        decode_text(&bytes, content_type.as_deref())
            .map(|decoded| decoded.text)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }

    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        let url = self.endpoint(&["user"])?;
        self.get_json(url, &[]).await
    }
}

fn paging_query(page: u32, per_page: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("per_page", per_page.to_string())]
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value)
        .map_err(|err| ApiError::new(FailureKind::Validation, format!("bad header value: {err}")))
}

fn too_large(max_bytes: u64, actual: u64) -> ApiError {
    ApiError::new(
        FailureKind::TooLarge,
        format!("{actual} bytes exceeds limit of {max_bytes}"),
    )
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

/// Builds the error for a non-success response, preferring the API's `message` field.
async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let message = response
        .bytes()
        .await
        .ok()
        .and_then(|body| serde_json::from_slice::<serde_json::Value>(&body).ok())
        .and_then(|body| body.get("message")?.as_str().map(ToOwned::to_owned))
        .unwrap_or_else(|| status.to_string());
    ApiError::from_status(status.as_u16(), message)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
