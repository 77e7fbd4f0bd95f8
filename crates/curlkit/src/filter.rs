//! URL filtering for executed requests

use url::Url;

/// Hostnames that are never reachable through the gateway
const BLOCKED_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Private network hostname prefixes
const BLOCKED_HOST_PREFIXES: &[&str] = &["192.168.", "10."];

/// Internal-only hostname suffixes
const BLOCKED_HOST_SUFFIXES: &[&str] = &[".local", ".internal"];

/// Decides which request URLs may be executed
#[derive(Debug, Clone)]
pub struct UrlFilter {
    /// Reject loopback, private and internal hostnames
    pub block_private_hosts: bool,
    /// If non-empty, URL must start with one of these
    pub allow_prefixes: Vec<String>,
    /// URL must not start with any of these
    pub block_prefixes: Vec<String>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self {
            block_private_hosts: true,
            allow_prefixes: Vec::new(),
            block_prefixes: Vec::new(),
        }
    }
}

impl UrlFilter {
    /// Create a filter with private hosts blocked and no prefix lists
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `url` may be requested
    ///
    /// Only `http` and `https` URLs pass. Unparseable URLs are rejected.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }

        if self.block_private_hosts && is_private_host(parsed.host_str().unwrap_or_default()) {
            return false;
        }

        if !self.allow_prefixes.is_empty()
            && !self
                .allow_prefixes
                .iter()
                .any(|prefix| url.starts_with(prefix))
        {
            return false;
        }

        !self
            .block_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix))
    }
}

fn is_private_host(host: &str) -> bool {
    BLOCKED_HOSTS.contains(&host)
        || BLOCKED_HOST_PREFIXES
            .iter()
            .any(|prefix| host.starts_with(prefix))
        || BLOCKED_HOST_SUFFIXES
            .iter()
            .any(|suffix| host.ends_with(suffix))
}
