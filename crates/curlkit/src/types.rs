//! Core types for curlkit

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default method when no flag changes it
pub const DEFAULT_METHOD: &str = "GET";

/// Structured HTTP request built from a curl command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Target URL; execution requires it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// HTTP method, sent verbatim
    pub method: String,

    /// Request headers keyed by literal name
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Default for RequestDescriptor {
    fn default() -> Self {
        Self {
            url: None,
            method: DEFAULT_METHOD.to_string(),
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

impl RequestDescriptor {
    /// Create a descriptor for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Set the method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Look up a header by its exact name
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Insert a header only when it is not already present
    pub(crate) fn default_header(&mut self, name: &str, value: &str) {
        self.headers
            .entry(name.to_string())
            .or_insert_with(|| value.to_string());
    }
}

/// Relayed response of an executed request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// HTTP status code
    pub status: u16,

    /// Canonical reason phrase, empty when unknown
    pub status_text: String,

    /// Response headers with lowercase names
    pub headers: BTreeMap<String, String>,

    /// Parsed JSON for JSON responses, a string otherwise
    pub body: serde_json::Value,
}

/// Tool input: a curl command line
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CurlRequest {
    /// Full command line, starting with `curl `
    pub command: String,
}

impl CurlRequest {
    /// Create a request for the given command line
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_default() {
        let req = RequestDescriptor::default();
        assert_eq!(req.url, None);
        assert_eq!(req.method, "GET");
        assert!(req.headers.is_empty());
        assert_eq!(req.body, None);
    }

    #[test]
    fn test_descriptor_builder() {
        let req = RequestDescriptor::new("https://example.com")
            .method("PUT")
            .header("X-Token", "abc")
            .body("a=1");

        assert_eq!(req.url.as_deref(), Some("https://example.com"));
        assert_eq!(req.method, "PUT");
        assert_eq!(req.get_header("X-Token"), Some("abc"));
        assert_eq!(req.get_header("x-token"), None);
        assert_eq!(req.body.as_deref(), Some("a=1"));
    }

    #[test]
    fn test_default_header_keeps_existing() {
        let mut req = RequestDescriptor::default().header("Content-Type", "application/json");
        req.default_header("Content-Type", "text/plain");
        req.default_header("Accept", "*/*");
        assert_eq!(req.get_header("Content-Type"), Some("application/json"));
        assert_eq!(req.get_header("Accept"), Some("*/*"));
    }

    #[test]
    fn test_descriptor_serialization() {
        let req = RequestDescriptor::default();
        let json = serde_json::to_string(&req).unwrap();
        // Optional None fields should be omitted
        assert!(!json.contains("url"));
        assert!(!json.contains("body"));
        assert!(json.contains("\"method\":\"GET\""));
    }

    #[test]
    fn test_result_serialization() {
        let result = ExecutionResult {
            status: 200,
            status_text: "OK".to_string(),
            body: serde_json::json!({"ok": true}),
            ..Default::default()
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"statusText\":\"OK\""));
        assert!(json.contains("\"body\":{\"ok\":true}"));
    }
}
