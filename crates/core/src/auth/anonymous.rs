use ingestlink_domain::{AuthScheme, HostKey, Result};

use super::Authenticator;
use crate::session::SessionStore;

/// No login; a host is usable as soon as it is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAuthenticator;

impl Authenticator for AnonymousAuthenticator {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::Anonymous
    }

    fn login(&self, _host: &HostKey, _store: &SessionStore) -> Result<()> {
        Ok(())
    }
}
