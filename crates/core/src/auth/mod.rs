//! Authentication strategies
//!
//! An [`Authenticator`] establishes a session with one host and decorates
//! outgoing requests. The [`crate::session::SessionManager`] owns the
//! session lifecycle and stamps the establishment time; authenticators only
//! talk to the host.

mod anonymous;
mod basic;
mod cookie_realm;
mod negotiated;

use std::fmt::Debug;
use std::sync::Arc;

use ingestlink_domain::{AuthMode, AuthScheme, HostKey, Result};

pub use anonymous::AnonymousAuthenticator;
pub use basic::PreemptiveBasicAuthenticator;
pub use cookie_realm::CookieRealmAuthenticator;
pub use negotiated::ExternalNegotiatedAuthenticator;

use crate::session::SessionStore;
use crate::transport::{Transport, TransportRequest};

/// Port for per-host login
pub trait Authenticator: Send + Sync + Debug {
    fn scheme(&self) -> AuthScheme;

    /// Establish a session with `host`.
    ///
    /// # Errors
    /// Returns [`ingestlink_domain::IngestError::Authentication`] when the
    /// host rejects the login or cannot be reached.
    fn login(&self, host: &HostKey, store: &SessionStore) -> Result<()>;

    /// Add per-request credentials; cookies are attached separately
    fn authorize(&self, _host: &HostKey, _request: &mut TransportRequest) {}
}

/// Build the authenticator for a resolved [`AuthMode`]
pub fn authenticator_for(mode: &AuthMode, transport: Arc<dyn Transport>) -> Arc<dyn Authenticator> {
    match mode {
        AuthMode::Anonymous => Arc::new(AnonymousAuthenticator),
        AuthMode::CookieRealm(credentials) => {
            Arc::new(CookieRealmAuthenticator::new(credentials.clone(), transport))
        }
        AuthMode::PreemptiveBasic(credentials) => {
            Arc::new(PreemptiveBasicAuthenticator::new(credentials))
        }
        AuthMode::ExternalNegotiated(path) => {
            Arc::new(ExternalNegotiatedAuthenticator::new(path.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ingestlink_domain::Credentials;

    use super::*;
    use crate::testing::ScriptedTransport;

    #[test]
    fn test_authenticator_for_each_mode() {
        let transport: Arc<dyn Transport> = Arc::new(ScriptedTransport::new());
        let creds = Credentials::new("u", "p", Some("native".into()));

        let cases = [
            (AuthMode::Anonymous, AuthScheme::Anonymous),
            (AuthMode::CookieRealm(creds.clone()), AuthScheme::CookieRealm),
            (AuthMode::PreemptiveBasic(creds), AuthScheme::PreemptiveBasic),
            (AuthMode::ExternalNegotiated(PathBuf::from("/etc/jaas.conf")), AuthScheme::ExternalNegotiated),
        ];
        for (mode, expected) in cases {
            assert_eq!(authenticator_for(&mode, Arc::clone(&transport)).scheme(), expected);
        }
    }
}
