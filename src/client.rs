//! HTTP client for the Context7 API.
//!
//! One [`Context7Client`] is built at startup and cloned into every request
//! handler (`reqwest::Client` is an `Arc` internally, so clones share the
//! connection pool). Every call carries `Authorization: Bearer <key>` and is
//! bounded by the configured timeout. There are no retries.
//!
//! | Method | Upstream call |
//! |--------|---------------|
//! | [`parse`](Context7Client::parse) | `POST /api/parse` |
//! | [`project_status`](Context7Client::project_status) | `GET /api/project/{id}` |
//! | [`refresh`](Context7Client::refresh) | `POST /api/refresh` |
//! | [`search`](Context7Client::search) | `GET /api/search?projectId=&query=&limit=` |

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::models::{ParsePayload, RefreshPayload};

/// Failure of a single upstream call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-2xx status.
    #[error("{message}")]
    Status {
        status: StatusCode,
        message: String,
        code: Option<String>,
    },

    /// Connection, DNS, TLS or timeout failure.
    #[error("{}", transport_message(.0))]
    Transport(#[from] reqwest::Error),

    /// The upstream answered 2xx with a body that is not JSON.
    #[error("invalid JSON in upstream response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl UpstreamError {
    /// Error code supplied by the upstream body, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            UpstreamError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Flatten a reqwest error and its causes into one line, so that e.g.
/// "operation timed out" is not hidden behind "error sending request".
fn transport_message(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = std::error::Error::source(cause);
    }
    message
}

#[derive(Debug, Clone)]
pub struct Context7Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Context7Client {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .context("CONTEXT7_API_KEY contains characters not allowed in an HTTP header")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Submit a repository or website for parsing.
    pub async fn parse(&self, payload: &ParsePayload) -> Result<Value, UpstreamError> {
        let url = self.endpoint(&["api", "parse"]);
        self.send(self.http.post(url).json(payload)).await
    }

    pub async fn project_status(&self, project_id: &str) -> Result<Value, UpstreamError> {
        let url = self.endpoint(&["api", "project", project_id]);
        self.send(self.http.get(url)).await
    }

    pub async fn refresh(&self, payload: &RefreshPayload) -> Result<Value, UpstreamError> {
        let url = self.endpoint(&["api", "refresh"]);
        self.send(self.http.post(url).json(payload)).await
    }

    pub async fn search(
        &self,
        project_id: &str,
        query: &str,
        limit: u32,
    ) -> Result<Value, UpstreamError> {
        let url = self.endpoint(&["api", "search"]);
        let limit = limit.to_string();
        let request = self.http.get(url).query(&[
            ("projectId", project_id),
            ("query", query),
            ("limit", limit.as_str()),
        ]);
        self.send(request).await
    }

    /// Append path segments to the base URL, percent-encoding each one.
    ///
    /// A base URL with its own path prefix (`https://host/v2/`) keeps it.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) URLs always have a path; config rejects every other scheme.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, UpstreamError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&body).map_err(UpstreamError::Decode);
        }

        let payload = serde_json::from_slice::<Value>(&body).ok();
        let field = |name: &str| {
            payload
                .as_ref()
                .and_then(|p| p.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Err(UpstreamError::Status {
            status,
            message: field("error")
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16())),
            code: field("code"),
        })
    }
}
