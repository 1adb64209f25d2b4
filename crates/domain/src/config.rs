//! Client configuration structures
//!
//! Loaded from environment variables or TOML/JSON files by the infra
//! layer; validated and resolved into an [`AuthMode`] here.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_IDLE_PER_HOST, DEFAULT_OUTAGE_RECOVERY_DELAY_MS,
    DEFAULT_SESSION_IDLE_THRESHOLD_SECS, DEFAULT_SINGLE_HOST_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS,
};
use crate::errors::{IngestError, Result};
use crate::types::{split_host_list, AuthMode, Credentials, HostKey};

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Candidate endpoints; accepts a comma-separated string or a list
    #[serde(deserialize_with = "deserialize_hosts")]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub metrics_enabled: bool,
}

/// Authentication settings
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub realm: Option<String>,
    /// External security configuration (e.g. a JAAS file) enabling
    /// negotiated authentication
    #[serde(default)]
    pub security_config: Option<PathBuf>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("realm", &self.realm)
            .field("security_config", &self.security_config)
            .finish()
    }
}

/// Session lifecycle timings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_idle_threshold_secs")]
    pub idle_threshold_secs: u64,
    #[serde(default = "default_outage_recovery_delay_ms")]
    pub outage_recovery_delay_ms: u64,
    #[serde(default = "default_single_host_retry_delay_ms")]
    pub single_host_retry_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_threshold_secs: DEFAULT_SESSION_IDLE_THRESHOLD_SECS,
            outage_recovery_delay_ms: DEFAULT_OUTAGE_RECOVERY_DELAY_MS,
            single_host_retry_delay_ms: DEFAULT_SINGLE_HOST_RETRY_DELAY_MS,
        }
    }
}

impl SessionConfig {
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }

    pub fn outage_recovery_delay(&self) -> Duration {
        Duration::from_millis(self.outage_recovery_delay_ms)
    }

    pub fn single_host_retry_delay(&self) -> Duration {
        Duration::from_millis(self.single_host_retry_delay_ms)
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Skip TLS certificate verification; only for test clusters with
    /// self-signed certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl ClientConfig {
    /// Configuration for an anonymous client over a comma-separated host
    /// list, with default timings.
    pub fn new(host_list: &str) -> Self {
        Self {
            hosts: split_host_list(host_list),
            auth: AuthConfig::default(),
            session: SessionConfig::default(),
            transport: TransportConfig::default(),
            metrics_enabled: false,
        }
    }

    /// Attach username/password credentials; a realm selects cookie login,
    /// no realm selects pre-emptive basic auth.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        realm: Option<String>,
    ) -> Self {
        self.auth.username = Some(username.into());
        self.auth.password = Some(password.into());
        self.auth.realm = realm;
        self
    }

    /// Enable externally negotiated authentication
    pub fn with_security_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.auth.security_config = Some(path.into());
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Parse every configured endpoint into its canonical key, preserving
    /// order (duplicates included).
    ///
    /// # Errors
    /// Returns [`IngestError::Config`] naming the first invalid endpoint.
    pub fn host_keys(&self) -> Result<Vec<HostKey>> {
        self.hosts
            .iter()
            .map(|endpoint| {
                HostKey::parse(endpoint).map_err(|e| IngestError::Config(e.to_string()))
            })
            .collect()
    }

    /// Resolve the authentication mode.
    ///
    /// # Errors
    /// Returns [`IngestError::Config`] when the settings are contradictory:
    /// a security config combined with credentials, or a password/realm
    /// without a username.
    pub fn auth_mode(&self) -> Result<AuthMode> {
        let auth = &self.auth;
        let username = auth.username.as_deref().filter(|u| !u.is_empty());
        let realm = auth.realm.as_deref().filter(|r| !r.is_empty());

        if let Some(path) = &auth.security_config {
            if username.is_some() || auth.password.is_some() {
                return Err(IngestError::Config(
                    "security_config is mutually exclusive with username/password".to_string(),
                ));
            }
            return Ok(AuthMode::ExternalNegotiated(path.clone()));
        }

        match username {
            Some(user) => {
                let password = auth.password.clone().unwrap_or_default();
                match realm {
                    Some(realm) => Ok(AuthMode::CookieRealm(Credentials::new(
                        user,
                        password,
                        Some(realm.to_string()),
                    ))),
                    None => Ok(AuthMode::PreemptiveBasic(Credentials::new(user, password, None))),
                }
            }
            None if realm.is_some() => {
                Err(IngestError::Config("realm is set but username is missing".to_string()))
            }
            None if auth.password.is_some() => {
                Err(IngestError::Config("password is set but username is missing".to_string()))
            }
            None => Ok(AuthMode::Anonymous),
        }
    }

    /// Validate the whole configuration.
    ///
    /// # Errors
    /// Returns [`IngestError::Config`] if no hosts are listed, an endpoint
    /// is invalid, the auth settings conflict, the security configuration
    /// file does not exist, or the idle threshold is zero.
    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            return Err(IngestError::Config("at least one host is required".to_string()));
        }
        self.host_keys()?;
        if let AuthMode::ExternalNegotiated(path) = self.auth_mode()? {
            if !path.is_file() {
                return Err(IngestError::Config(format!(
                    "security_config file not found: {}",
                    path.display()
                )));
            }
        }
        if self.session.idle_threshold_secs == 0 {
            return Err(IngestError::Config("idle_threshold_secs must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HostList {
    Csv(String),
    List(Vec<String>),
}

fn deserialize_hosts<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match HostList::deserialize(deserializer)? {
        HostList::Csv(list) => split_host_list(&list),
        HostList::List(items) => {
            items.iter().flat_map(|item| split_host_list(item)).collect()
        }
    })
}

fn default_idle_threshold_secs() -> u64 {
    DEFAULT_SESSION_IDLE_THRESHOLD_SECS
}

fn default_outage_recovery_delay_ms() -> u64 {
    DEFAULT_OUTAGE_RECOVERY_DELAY_MS
}

fn default_single_host_retry_delay_ms() -> u64 {
    DEFAULT_SINGLE_HOST_RETRY_DELAY_MS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_max_idle_per_host() -> usize {
    DEFAULT_MAX_IDLE_PER_HOST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_host_list_with_defaults() {
        let config = ClientConfig::new("a:8764, b:8764");
        assert_eq!(config.hosts, vec!["a:8764", "b:8764"]);
        assert_eq!(config.session.idle_threshold(), Duration::from_secs(599));
        assert_eq!(config.session.outage_recovery_delay(), Duration::from_secs(2));
        assert_eq!(config.session.single_host_retry_delay(), Duration::from_secs(1));
        assert_eq!(config.auth_mode().unwrap(), AuthMode::Anonymous);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_mode_resolution() {
        let realm = ClientConfig::new("a:1").with_credentials("admin", "pw", Some("native".into()));
        assert!(matches!(realm.auth_mode().unwrap(), AuthMode::CookieRealm(c) if c.realm.as_deref() == Some("native")));

        let basic = ClientConfig::new("a:1").with_credentials("admin", "pw", None);
        assert!(matches!(basic.auth_mode().unwrap(), AuthMode::PreemptiveBasic(_)));

        let negotiated = ClientConfig::new("a:1").with_security_config("/etc/jaas.conf");
        assert_eq!(
            negotiated.auth_mode().unwrap(),
            AuthMode::ExternalNegotiated(PathBuf::from("/etc/jaas.conf"))
        );
    }

    #[test]
    fn test_conflicting_auth_settings_are_rejected() {
        let both = ClientConfig::new("a:1")
            .with_credentials("admin", "pw", None)
            .with_security_config("/etc/jaas.conf");
        assert!(matches!(both.auth_mode(), Err(IngestError::Config(_))));

        let mut realm_only = ClientConfig::new("a:1");
        realm_only.auth.realm = Some("native".into());
        assert!(matches!(realm_only.auth_mode(), Err(IngestError::Config(_))));
    }

    #[test]
    fn test_validate_requires_existing_security_config() {
        let missing = ClientConfig::new("a:1").with_security_config("/nonexistent/jaas.conf");
        let err = missing.validate().unwrap_err();
        assert!(matches!(err, IngestError::Config(message) if message.contains("jaas.conf")));

        let file = tempfile::NamedTempFile::new().unwrap();
        let present = ClientConfig::new("a:1").with_security_config(file.path());
        assert!(present.validate().is_ok());

        let dir = tempfile::TempDir::new().unwrap();
        let directory = ClientConfig::new("a:1").with_security_config(dir.path());
        assert!(matches!(directory.validate(), Err(IngestError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_and_invalid_hosts() {
        assert!(matches!(ClientConfig::new(" , ").validate(), Err(IngestError::Config(_))));
        assert!(matches!(ClientConfig::new("ftp://x:1").validate(), Err(IngestError::Config(_))));
    }

    #[test]
    fn test_hosts_deserialize_from_string_or_list() {
        let from_csv: ClientConfig =
            serde_json::from_str(r#"{"hosts": "a:1,b:2"}"#).unwrap();
        assert_eq!(from_csv.hosts, vec!["a:1", "b:2"]);

        let from_list: ClientConfig =
            serde_json::from_str(r#"{"hosts": ["a:1", "b:2"], "metrics_enabled": true}"#).unwrap();
        assert_eq!(from_list.hosts, vec!["a:1", "b:2"]);
        assert!(from_list.metrics_enabled);
        assert_eq!(from_list.session, SessionConfig::default());
    }

    #[test]
    fn test_toml_sections() {
        let config: ClientConfig = toml::from_str(
            r#"
hosts = "a:8764,b:8764"

[auth]
username = "admin"
password = "pw"
realm = "native"

[session]
idle_threshold_secs = 120
"#,
        )
        .unwrap();
        assert_eq!(config.session.idle_threshold_secs, 120);
        assert_eq!(config.session.outage_recovery_delay_ms, 2000);
        assert!(matches!(config.auth_mode().unwrap(), AuthMode::CookieRealm(_)));
    }

    #[test]
    fn test_auth_debug_redacts_password() {
        let config = ClientConfig::new("a:1").with_credentials("admin", "hunter2", None);
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
