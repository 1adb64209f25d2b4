//! Canonical host keys
//!
//! Every configured endpoint string is normalized to `scheme://host:port`
//! before it is used as a session-table key, so that `a:8764`,
//! `http://a:8764/` and `HTTP://A:8764/api` all share one session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{IngestError, Result};

/// Canonical `scheme://host:port` identity of one cluster host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HostKey {
    key: String,
    host: String,
}

impl HostKey {
    /// Parse and normalize an endpoint string.
    ///
    /// A missing scheme defaults to `http`; a missing port defaults to the
    /// scheme's well-known port. Paths and query strings are discarded.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidEndpoint`] for blank input, unsupported
    /// schemes, or strings without a host component.
    pub fn parse(endpoint: &str) -> Result<Self> {
        let trimmed = endpoint.trim();
        if trimmed.is_empty() {
            return Err(IngestError::InvalidEndpoint("endpoint is empty".to_string()));
        }

        let lowered = trimmed.to_ascii_lowercase();
        let with_scheme = if lowered.starts_with("http://") || lowered.starts_with("https://") {
            trimmed.to_string()
        } else if trimmed.contains("://") {
            return Err(IngestError::InvalidEndpoint(format!(
                "unsupported scheme in '{trimmed}' (expected http or https)"
            )));
        } else {
            format!("http://{trimmed}")
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| IngestError::InvalidEndpoint(format!("'{trimmed}': {e}")))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| IngestError::InvalidEndpoint(format!("'{trimmed}' has no host")))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| IngestError::InvalidEndpoint(format!("'{trimmed}' has no port")))?;

        Ok(Self { key: format!("{}://{}:{}", url.scheme(), host, port), host })
    }

    /// The canonical `scheme://host:port` string
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The bare host name, used to scope cookies
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Append a path (with optional query string) to this host.
    ///
    /// A missing leading `/` is added.
    pub fn join(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.key, path)
        } else {
            format!("{}/{}", self.key, path)
        }
    }

    /// Derive the host key of an absolute request URL.
    ///
    /// # Errors
    /// Returns [`IngestError::InvalidEndpoint`] if the URL cannot be parsed.
    pub fn from_url(url: &str) -> Result<Self> {
        Self::parse(url)
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl FromStr for HostKey {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HostKey {
    type Error = IngestError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<HostKey> for String {
    fn from(value: HostKey) -> Self {
        value.key
    }
}

/// Split a comma-separated host list, skipping blank entries.
pub fn split_host_list(list: &str) -> Vec<String> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_host_and_port_defaults_to_http() {
        let key = HostKey::parse("localhost:8764").unwrap();
        assert_eq!(key.as_str(), "http://localhost:8764");
        assert_eq!(key.host(), "localhost");
    }

    #[test]
    fn test_missing_port_uses_scheme_default() {
        assert_eq!(HostKey::parse("http://ingest.local").unwrap().as_str(), "http://ingest.local:80");
        assert_eq!(
            HostKey::parse("https://ingest.local").unwrap().as_str(),
            "https://ingest.local:443"
        );
    }

    #[test]
    fn test_equivalent_endpoints_share_one_key() {
        let a = HostKey::parse("HTTP://Node-1:8764/api/apollo").unwrap();
        let b = HostKey::parse(" node-1:8764 ").unwrap();
        let c = HostKey::parse("http://node-1:8764/?x=1").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_rejects_invalid_endpoints() {
        assert!(matches!(HostKey::parse(""), Err(IngestError::InvalidEndpoint(_))));
        assert!(matches!(HostKey::parse("   "), Err(IngestError::InvalidEndpoint(_))));
        assert!(matches!(HostKey::parse("ftp://node:21"), Err(IngestError::InvalidEndpoint(_))));
        assert!(matches!(HostKey::parse("http://:8764"), Err(IngestError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_join_adds_missing_slash() {
        let key = HostKey::parse("node:8764").unwrap();
        assert_eq!(key.join("/index/docs"), "http://node:8764/index/docs");
        assert_eq!(key.join("index/docs?x=1"), "http://node:8764/index/docs?x=1");
    }

    #[test]
    fn test_ordering_is_lexicographic_on_key() {
        let mut keys = vec![
            HostKey::parse("c:1").unwrap(),
            HostKey::parse("a:1").unwrap(),
            HostKey::parse("b:1").unwrap(),
        ];
        keys.sort();
        let rendered: Vec<&str> = keys.iter().map(HostKey::as_str).collect();
        assert_eq!(rendered, vec!["http://a:1", "http://b:1", "http://c:1"]);
    }

    #[test]
    fn test_split_host_list() {
        assert_eq!(split_host_list("a:1, b:2,,c:3 "), vec!["a:1", "b:2", "c:3"]);
        assert!(split_host_list(" , ").is_empty());
    }
}
