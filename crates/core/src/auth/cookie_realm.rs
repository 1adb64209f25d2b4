//! Realm login against the session API
//!
//! `POST {host}/api/session?realmName={realm}` with a JSON body of
//! credentials. The host answers with a session cookie that is replayed on
//! every later request.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use ingestlink_domain::constants::{IDLE_TIMEOUT_MARKER, REALM_QUERY_PARAM, SESSION_API_PATH};
use ingestlink_domain::{AuthScheme, Credentials, HostKey, IngestError, Result};

use super::Authenticator;
use crate::session::SessionStore;
use crate::transport::{Transport, TransportRequest};

#[derive(Debug)]
pub struct CookieRealmAuthenticator {
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl CookieRealmAuthenticator {
    pub fn new(credentials: Credentials, transport: Arc<dyn Transport>) -> Self {
        Self { credentials, transport }
    }

    fn login_url(&self, host: &HostKey) -> String {
        let realm = self.credentials.realm.as_deref().unwrap_or_default();
        format!(
            "{}?{}={}",
            host.join(SESSION_API_PATH),
            REALM_QUERY_PARAM,
            urlencoding::encode(realm)
        )
    }

    fn attempt(&self, host: &HostKey, store: &SessionStore, idle_retry_left: bool) -> Result<()> {
        store.clear_cookies(host);

        let request = TransportRequest::post(self.login_url(host)).with_json(&json!({
            "username": self.credentials.username,
            "password": self.credentials.password,
        }))?;

        let mut response = self.transport.execute(&request).map_err(|err| {
            IngestError::Authentication {
                host: host.to_string(),
                status: None,
                message: err.to_string(),
            }
        })?;
        store.capture_cookies(host, &response);

        match response.status() {
            200 | 201 | 204 => {
                response.drain();
                debug!(host = %host, username = %self.credentials.username, "Session established");
                Ok(())
            }
            401 => {
                let body = response.read_text();
                if idle_retry_left && body.contains(IDLE_TIMEOUT_MARKER) {
                    info!(host = %host, "Login raced a session idle timeout; retrying once");
                    return self.attempt(host, store, false);
                }
                warn!(host = %host, status = 401, "Session login rejected");
                Err(IngestError::Authentication {
                    host: host.to_string(),
                    status: Some(401),
                    message: body,
                })
            }
            status => {
                let body = response.read_text();
                warn!(host = %host, status, "Session login failed");
                Err(IngestError::Authentication {
                    host: host.to_string(),
                    status: Some(status),
                    message: body,
                })
            }
        }
    }
}

impl Authenticator for CookieRealmAuthenticator {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::CookieRealm
    }

    fn login(&self, host: &HostKey, store: &SessionStore) -> Result<()> {
        self.attempt(host, store, true)
    }
}
