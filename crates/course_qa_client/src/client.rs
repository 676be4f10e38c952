//! HTTP client: `POST /query` and `GET /courses` against the API base URL.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::StatusCode;

use crate::messages::{CourseStats, QueryRequest, QueryResponse};

/// Default API base, relative paths are joined onto it.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// Request/response failure at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The question-answering service as seen by the session controller.
///
/// Implementations resolve each call exactly once; there is no cancellation.
pub trait Backend {
    fn query<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> BoxFuture<'a, Result<QueryResponse, ClientError>>;

    fn course_stats(&self) -> BoxFuture<'_, Result<CourseStats, ClientError>>;
}

/// [`Backend`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Client for the API rooted at `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn post_query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        let url = self.endpoint("query");
        tracing::debug!(%url, session_id = ?request.session_id, "sending query");
        let resp = self.http.post(url).json(request).send().await?;
        decode(resp, "query").await
    }

    pub async fn get_courses(&self) -> Result<CourseStats, ClientError> {
        let url = self.endpoint("courses");
        tracing::debug!(%url, "loading course stats");
        let resp = self.http.get(url).send().await?;
        decode(resp, "courses").await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    endpoint: &'static str,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ClientError::Status { endpoint, status });
    }
    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

impl Backend for HttpClient {
    fn query<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> BoxFuture<'a, Result<QueryResponse, ClientError>> {
        self.post_query(request).boxed()
    }

    fn course_stats(&self) -> BoxFuture<'_, Result<CourseStats, ClientError>> {
        self.get_courses().boxed()
    }
}
