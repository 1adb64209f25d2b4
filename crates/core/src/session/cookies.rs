//! Session cookie jar
//!
//! Captures `Set-Cookie` headers from host responses and replays them on
//! later requests to the same host. Values are parsed with the `cookie`
//! crate; `Domain`, `Path`, `Max-Age` and `Expires` are honored.

use std::fmt;

use cookie::time::{Duration, OffsetDateTime};
use cookie::Cookie;
use tracing::debug;

/// One stored cookie
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    /// Lower-cased domain without a leading dot
    pub domain: String,
    pub path: String,
    /// `None` for session cookies
    pub expires_at: Option<OffsetDateTime>,
}

impl fmt::Debug for StoredCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCookie")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl StoredCookie {
    fn matches(&self, host: &str, path: &str, now: OffsetDateTime) -> bool {
        !self.is_expired(now) && domain_matches(&self.domain, host) && path_matches(&self.path, path)
    }

    fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    fn same_slot(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

/// Cookies captured from host responses
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<StoredCookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Store one `Set-Cookie` header value received from `host`.
    ///
    /// Malformed values are ignored. A cookie whose `Max-Age` or `Expires`
    /// is already in the past removes the matching cookie.
    pub fn store(&mut self, host: &str, set_cookie: &str) {
        self.store_at(host, set_cookie, OffsetDateTime::now_utc());
    }

    pub(crate) fn store_at(&mut self, host: &str, set_cookie: &str, now: OffsetDateTime) {
        let cookie = match Cookie::parse(set_cookie.to_string()) {
            Ok(cookie) => cookie,
            Err(err) => {
                debug!(host, error = %err, "Ignoring malformed Set-Cookie header");
                return;
            }
        };
        let stored = to_stored(host, &cookie, now);

        self.cookies.retain(|existing| !existing.same_slot(&stored) && !existing.is_expired(now));
        if !stored.is_expired(now) {
            self.cookies.push(stored);
        }
    }

    /// `Cookie` header value for a request to `host` at `path`
    pub fn header_value(&self, host: &str, path: &str) -> Option<String> {
        self.header_value_at(host, path, OffsetDateTime::now_utc())
    }

    pub(crate) fn header_value_at(
        &self,
        host: &str,
        path: &str,
        now: OffsetDateTime,
    ) -> Option<String> {
        let host = host.to_ascii_lowercase();
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|cookie| cookie.matches(&host, path, now))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    /// Drop every cookie whose domain contains `host` or is contained in it.
    ///
    /// Returns the number of cookies removed.
    pub fn clear_for_host(&mut self, host: &str) -> usize {
        let host = host.to_ascii_lowercase();
        let before = self.cookies.len();
        self.cookies
            .retain(|cookie| !(cookie.domain.contains(&host) || host.contains(&cookie.domain)));
        before - self.cookies.len()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }
}

fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    host == cookie_domain
        || host.strip_suffix(cookie_domain).is_some_and(|prefix| prefix.ends_with('.'))
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == "/" || cookie_path == request_path {
        return true;
    }
    request_path.strip_prefix(cookie_path).is_some_and(|rest| {
        cookie_path.ends_with('/') || rest.starts_with('/')
    })
}

/// `Max-Age` takes precedence over `Expires`
fn to_stored(default_domain: &str, cookie: &Cookie<'_>, now: OffsetDateTime) -> StoredCookie {
    let domain = cookie
        .domain()
        .map(|d| d.trim_start_matches('.'))
        .filter(|d| !d.is_empty())
        .unwrap_or(default_domain)
        .to_ascii_lowercase();
    let path = cookie.path().filter(|p| p.starts_with('/')).unwrap_or("/").to_string();
    let expires_at = match cookie.max_age() {
        Some(max_age) if max_age <= Duration::ZERO => Some(OffsetDateTime::UNIX_EPOCH),
        Some(max_age) => Some(now + max_age),
        None => cookie.expires_datetime(),
    };

    StoredCookie {
        name: cookie.name().to_string(),
        value: cookie.value().trim_matches('"').to_string(),
        domain,
        path,
        expires_at,
    }
}

/// Path component of an absolute URL, `/` when absent
pub(crate) fn url_path(url: &str) -> &str {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let without_query = after_scheme.split(['?', '#']).next().unwrap_or_default();
    without_query.find('/').map_or("/", |idx| &without_query[idx..])
}
