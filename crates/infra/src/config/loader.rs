//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment, if one exists
//! 2. Attempts to load from environment variables
//! 3. If `INGESTLINK_HOSTS` is missing, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON or TOML)
//!
//! ## Environment Variables
//! - `INGESTLINK_HOSTS`: comma-separated endpoints (required)
//! - `INGESTLINK_USERNAME` / `INGESTLINK_PASSWORD`: credentials
//! - `INGESTLINK_REALM`: login realm; enables cookie session login
//! - `INGESTLINK_SECURITY_CONFIG`: external security configuration file
//! - `INGESTLINK_SESSION_IDLE_SECS`: idle threshold before a session reset
//! - `INGESTLINK_OUTAGE_RECOVERY_DELAY_MS`: wait before rebuilding sessions
//! - `INGESTLINK_SINGLE_HOST_RETRY_DELAY_MS`: wait before the single-host
//!   retry
//! - `INGESTLINK_TIMEOUT_SECS` / `INGESTLINK_CONNECT_TIMEOUT_SECS`: HTTP
//!   timeouts
//! - `INGESTLINK_USER_AGENT`: HTTP user agent
//! - `INGESTLINK_ACCEPT_INVALID_CERTS`: skip TLS verification (true/false)
//! - `INGESTLINK_METRICS_ENABLED`: emit metrics (true/false)
//!
//! ## File Locations
//! The loader probes, in order, `ingestlink.{toml,json}` and
//! `config.{toml,json}` in the current directory, its parent, and the
//! executable's directory.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ingestlink_domain::{ClientConfig, IngestError, Result};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] =
    ["ingestlink.toml", "ingestlink.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `IngestError::Config` if configuration cannot be loaded from
/// either source or fails validation.
pub fn load() -> Result<ClientConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `INGESTLINK_HOSTS` is required; everything else falls back to the
/// defaults of [`ClientConfig`].
///
/// # Errors
/// Returns `IngestError::Config` if `INGESTLINK_HOSTS` is missing, a
/// numeric variable does not parse, or the result fails validation.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(&env_var("INGESTLINK_HOSTS")?);

    config.auth.username = env_opt("INGESTLINK_USERNAME");
    config.auth.password = env_opt("INGESTLINK_PASSWORD");
    config.auth.realm = env_opt("INGESTLINK_REALM");
    config.auth.security_config = env_opt("INGESTLINK_SECURITY_CONFIG").map(PathBuf::from);

    if let Some(secs) = env_parse("INGESTLINK_SESSION_IDLE_SECS")? {
        config.session.idle_threshold_secs = secs;
    }
    if let Some(ms) = env_parse("INGESTLINK_OUTAGE_RECOVERY_DELAY_MS")? {
        config.session.outage_recovery_delay_ms = ms;
    }
    if let Some(ms) = env_parse("INGESTLINK_SINGLE_HOST_RETRY_DELAY_MS")? {
        config.session.single_host_retry_delay_ms = ms;
    }
    if let Some(secs) = env_parse("INGESTLINK_TIMEOUT_SECS")? {
        config.transport.timeout_secs = secs;
    }
    if let Some(secs) = env_parse("INGESTLINK_CONNECT_TIMEOUT_SECS")? {
        config.transport.connect_timeout_secs = secs;
    }
    config.transport.user_agent = env_opt("INGESTLINK_USER_AGENT");
    config.transport.accept_invalid_certs = env_bool("INGESTLINK_ACCEPT_INVALID_CERTS", false);
    config.metrics_enabled = env_bool("INGESTLINK_METRICS_ENABLED", false);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `IngestError::Config` if the file is missing, unreadable,
/// malformed, or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(IngestError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            IngestError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(InfraError::from)?;
    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => Ok(toml::from_str(contents).map_err(InfraError::from)?),
        "json" => serde_json::from_str(contents)
            .map_err(|e| IngestError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(IngestError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        IngestError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; empty values count as unset
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| IngestError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
