use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use ingestlink_domain::{AuthScheme, Credentials, HostKey, Result};

use super::Authenticator;
use crate::session::SessionStore;
use crate::transport::TransportRequest;

/// Sends `Authorization: Basic` on every request without a login round trip
pub struct PreemptiveBasicAuthenticator {
    header_value: String,
    username: String,
}

impl PreemptiveBasicAuthenticator {
    pub fn new(credentials: &Credentials) -> Self {
        let token = STANDARD.encode(format!("{}:{}", credentials.username, credentials.password));
        Self { header_value: format!("Basic {token}"), username: credentials.username.clone() }
    }
}

impl std::fmt::Debug for PreemptiveBasicAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreemptiveBasicAuthenticator")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Authenticator for PreemptiveBasicAuthenticator {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::PreemptiveBasic
    }

    fn login(&self, host: &HostKey, _store: &SessionStore) -> Result<()> {
        debug!(host = %host, username = %self.username, "Using pre-emptive basic auth");
        Ok(())
    }

    fn authorize(&self, _host: &HostKey, request: &mut TransportRequest) {
        request.set_header("Authorization", self.header_value.clone());
    }
}
