//! Gateway: parse, filter and execute curl commands
//!
//! [`Gateway::run`] takes a command line and returns the relayed response.
//! [`Gateway::handle`] wraps it in the HTTP surface: a `GET` whose path is
//! the percent-encoded command, answered with JSON and CORS headers.

use crate::command::parse_command;
use crate::error::{ExecuteError, GatewayError};
use crate::executor::{ExecuteOptions, Executor, HttpExecutor, DEFAULT_TIMEOUT};
use crate::filter::UrlFilter;
use crate::types::{CurlRequest, ExecutionResult};
use percent_encoding::percent_decode_str;
use schemars::schema_for;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default limit on decoded command length, in characters
pub const DEFAULT_MAX_COMMAND_LEN: usize = 2000;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Response produced by [`Gateway::handle`]
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, in send order
    pub headers: Vec<(String, String)>,
    /// Response body, `None` for empty
    pub body: Option<String>,
}

impl GatewayResponse {
    /// JSON response with the CORS origin header
    fn json(status: u16, body: String) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
                ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
            ],
            body: Some(body),
        }
    }

    /// `{"error": message}` response
    fn error(status: u16, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::json(status, json!({ "error": message }).to_string())
    }

    /// Empty preflight response
    fn preflight() -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
                (
                    "Access-Control-Allow-Methods".to_string(),
                    "GET, OPTIONS".to_string(),
                ),
                (
                    "Access-Control-Allow-Headers".to_string(),
                    "Content-Type".to_string(),
                ),
            ],
            body: None,
        }
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_str(b).ok())
    }
}

/// Builder for configuring a [`Gateway`]
#[derive(Default)]
pub struct GatewayBuilder {
    user_agent: Option<String>,
    timeout: Option<Duration>,
    max_command_len: Option<usize>,
    filter: UrlFilter,
    executor: Option<Box<dyn Executor>>,
}

impl GatewayBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set User-Agent used when a command sets none
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set total request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set maximum decoded command length
    pub fn max_command_len(mut self, len: usize) -> Self {
        self.max_command_len = Some(len);
        self
    }

    /// Block or allow loopback, private and internal hosts
    pub fn block_private_hosts(mut self, block: bool) -> Self {
        self.filter.block_private_hosts = block;
        self
    }

    /// Add URL prefix to allow list
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filter.allow_prefixes.push(prefix.into());
        self
    }

    /// Add URL prefix to block list
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filter.block_prefixes.push(prefix.into());
        self
    }

    /// Replace the HTTP executor
    ///
    /// `user_agent` and `timeout` only apply to the built-in executor.
    pub fn executor(mut self, executor: Box<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Build the gateway
    pub fn build(self) -> Gateway {
        let executor = self.executor.unwrap_or_else(|| {
            Box::new(HttpExecutor::with_options(ExecuteOptions {
                user_agent: self.user_agent,
                timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            }))
        });

        Gateway {
            executor,
            filter: self.filter,
            max_command_len: self.max_command_len.unwrap_or(DEFAULT_MAX_COMMAND_LEN),
        }
    }
}

/// Configured curl gateway
pub struct Gateway {
    executor: Box<dyn Executor>,
    filter: UrlFilter,
    max_command_len: usize,
}

impl Default for Gateway {
    fn default() -> Self {
        GatewayBuilder::new().build()
    }
}

impl Gateway {
    /// Create a new gateway builder
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// URL filter in use
    pub fn filter(&self) -> &UrlFilter {
        &self.filter
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> Value {
        let schema = schema_for!(CurlRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Get output schema as JSON
    pub fn output_schema(&self) -> Value {
        let schema = schema_for!(ExecutionResult);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Parse, check and execute a command line
    pub async fn run(&self, command: &str) -> Result<ExecutionResult, GatewayError> {
        if command.chars().count() > self.max_command_len {
            return Err(GatewayError::CommandTooLong);
        }

        let parsed = parse_command(command)?.ok_or(GatewayError::NotACommand)?;

        if let Some(url) = parsed.url.as_deref() {
            if !self.filter.is_allowed(url) {
                warn!(url, "Blocked request URL");
                return Err(GatewayError::BlockedUrl);
            }
        }

        debug!(executor = self.executor.name(), method = %parsed.method, "Executing request");
        match self.executor.execute(&parsed).await {
            Ok(result) => Ok(result),
            Err(source) => {
                warn!("Request failed: {}", source);
                Err(GatewayError::Execute { parsed, source })
            }
        }
    }

    /// Handle an HTTP request whose path carries the encoded command
    pub async fn handle(&self, method: &str, path: &str) -> GatewayResponse {
        if method.eq_ignore_ascii_case("OPTIONS") {
            return GatewayResponse::preflight();
        }

        if !method.eq_ignore_ascii_case("GET") {
            return GatewayResponse::error(405, "Method not allowed");
        }

        if path.is_empty() || path == "/" {
            return GatewayResponse::json(
                200,
                json!({
                    "message": "CURL Executor API",
                    "usage": "GET /{urlencoded_curl_command}"
                })
                .to_string(),
            );
        }

        let encoded = path.strip_prefix('/').unwrap_or(path);
        let result = match decode_command(encoded) {
            Ok(command) => self.run(&command).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(result) => GatewayResponse::json(
                200,
                serde_json::to_string_pretty(&result).unwrap_or_default(),
            ),
            Err(GatewayError::Execute { parsed, source })
                if !matches!(source, ExecuteError::MissingUrl) =>
            {
                GatewayResponse::json(
                    500,
                    json!({ "parsed": parsed, "error": source.to_string() }).to_string(),
                )
            }
            Err(e) => GatewayResponse::error(e.status_code(), e.to_string()),
        }
    }
}

/// Percent-decode a path segment into the command line.
///
/// Every `%` must start a two-digit hex escape and the result must be UTF-8.
fn decode_command(encoded: &str) -> Result<String, GatewayError> {
    let bytes = encoded.as_bytes();
    let escapes_valid = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .all(|(i, _)| {
            bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        });
    if !escapes_valid {
        return Err(GatewayError::MalformedUri);
    }

    percent_decode_str(encoded)
        .decode_utf8()
        .map(|command| command.into_owned())
        .map_err(|_| GatewayError::MalformedUri)
}
