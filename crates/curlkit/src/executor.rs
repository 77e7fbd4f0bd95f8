//! Request execution
//!
//! Design: the [`Executor`] trait is the seam between parsing and the
//! network. [`HttpExecutor`] sends descriptors with reqwest; tests and
//! embedders can plug in their own implementation.

use crate::error::ExecuteError;
use crate::types::{ExecutionResult, RequestDescriptor};
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

/// Default total request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport options for [`HttpExecutor`]
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// User-Agent sent when the command sets none
    pub user_agent: Option<String>,
    /// Total request timeout
    pub timeout: Duration,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Something that can run a request descriptor
#[async_trait]
pub trait Executor: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Execute the request and collect the response
    async fn execute(&self, request: &RequestDescriptor) -> Result<ExecutionResult, ExecuteError>;
}

/// HTTP executor backed by reqwest
#[derive(Debug, Clone, Default)]
pub struct HttpExecutor {
    options: ExecuteOptions,
}

impl HttpExecutor {
    /// Create an executor with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor with custom options
    pub fn with_options(options: ExecuteOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn execute(&self, request: &RequestDescriptor) -> Result<ExecutionResult, ExecuteError> {
        let url = match request.url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => return Err(ExecuteError::MissingUrl),
        };

        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ExecuteError::InvalidMethod(request.method.clone()))?;
        let headers = build_headers(&request.headers)?;

        let user_agent = self
            .options
            .user_agent
            .as_deref()
            .unwrap_or(DEFAULT_USER_AGENT);

        // Build client
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(self.options.timeout)
            .build()
            .map_err(ExecuteError::ClientBuildError)?;

        let mut http_request = client.request(method, url).headers(headers);
        if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
            http_request = http_request.body(body.to_string());
        }

        let response = http_request
            .send()
            .await
            .map_err(ExecuteError::from_reqwest)?;

        let status = response.status();
        let headers = collect_headers(response.headers());
        let is_json = headers
            .get(CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.contains("application/json"));

        let text = response.text().await.map_err(ExecuteError::from_reqwest)?;
        let body = if is_json {
            serde_json::from_str(&text).map_err(|e| {
                warn!(url, "Response declared JSON but failed to parse: {}", e);
                ExecuteError::InvalidJson(e.to_string())
            })?
        } else {
            serde_json::Value::String(text)
        };

        Ok(ExecutionResult {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

/// Convert descriptor headers into a reqwest header map
fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ExecuteError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ExecuteError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ExecuteError::InvalidHeader(name.clone()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Flatten response headers, joining repeated names with `", "`
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    out
}
