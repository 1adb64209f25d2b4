//! Tracing subscriber setup

use ingestlink_domain::{IngestError, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log output format
pub const LOG_FORMAT_ENV: &str = "INGESTLINK_LOG_FORMAT";

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Plain,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Read the format from `INGESTLINK_LOG_FORMAT` (`json` or anything
    /// else for plain).
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Plain,
        }
    }
}

/// Install a global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
///
/// # Errors
/// Returns `IngestError::Config` if a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().with_ansi(false).try_init(),
    };

    installed.map_err(|e| IngestError::Config(format!("failed to install tracing subscriber: {e}")))
}
