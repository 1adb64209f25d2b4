//! Credentials and authentication modes

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Username/password pair, optionally bound to a login realm.
///
/// Immutable for the lifetime of a client. The password never appears in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub realm: Option<String>,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        realm: Option<String>,
    ) -> Self {
        Self { username: username.into(), password: password.into(), realm }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("realm", &self.realm)
            .finish()
    }
}

/// How sessions are established with each host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// No credentials; every host is usable as soon as it is listed
    Anonymous,
    /// Cookie session obtained by POSTing credentials to the realm login API
    CookieRealm(Credentials),
    /// `Authorization: Basic` header added to every request
    PreemptiveBasic(Credentials),
    /// Negotiation (e.g. Kerberos) handled by an externally configured
    /// security layer described by the given file
    ExternalNegotiated(PathBuf),
}

impl AuthMode {
    /// Short, log-friendly name of the mode
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Self::Anonymous => AuthScheme::Anonymous,
            Self::CookieRealm(_) => AuthScheme::CookieRealm,
            Self::PreemptiveBasic(_) => AuthScheme::PreemptiveBasic,
            Self::ExternalNegotiated(_) => AuthScheme::ExternalNegotiated,
        }
    }
}

/// Credential-free discriminant of [`AuthMode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    Anonymous,
    CookieRealm,
    PreemptiveBasic,
    ExternalNegotiated,
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Anonymous => "anonymous",
            Self::CookieRealm => "cookie_realm",
            Self::PreemptiveBasic => "preemptive_basic",
            Self::ExternalNegotiated => "external_negotiated",
        };
        f.write_str(name)
    }
}
