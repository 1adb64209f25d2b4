use std::path::{Path, PathBuf};

use tracing::debug;

use ingestlink_domain::{AuthScheme, HostKey, Result};

use super::Authenticator;
use crate::session::SessionStore;

/// Negotiated (e.g. Kerberos) authentication performed by an externally
/// configured security layer inside the transport.
///
/// Login is a no-op here; the security configuration path is kept for
/// diagnostics.
#[derive(Debug, Clone)]
pub struct ExternalNegotiatedAuthenticator {
    security_config: PathBuf,
}

impl ExternalNegotiatedAuthenticator {
    pub fn new(security_config: PathBuf) -> Self {
        Self { security_config }
    }

    pub fn security_config(&self) -> &Path {
        &self.security_config
    }
}

impl Authenticator for ExternalNegotiatedAuthenticator {
    fn scheme(&self) -> AuthScheme {
        AuthScheme::ExternalNegotiated
    }

    fn login(&self, host: &HostKey, _store: &SessionStore) -> Result<()> {
        debug!(
            host = %host,
            security_config = %self.security_config.display(),
            "Session negotiation delegated to external security configuration"
        );
        Ok(())
    }
}
