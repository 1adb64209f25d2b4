//! Error types used throughout the client

use thiserror::Error;

/// Categories of ingestion errors, used to decide whether a failed attempt
/// should move on to another host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Login rejected or failed at the network level
    Authentication,
    /// Session could not be re-established for a host
    Session,
    /// Host answered with a non-success status
    Server,
    /// Network-level failure talking to a host
    Transport,
    /// Every candidate host has been tried or none remain
    Exhausted,
    /// Invalid configuration or input, never retried
    Config,
    /// Client has been shut down
    Shutdown,
}

/// Main error type for ingestion operations
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Authentication with {host} failed{}: {message}", status_suffix(.status))]
    Authentication { host: String, status: Option<u16>, message: String },

    #[error(
        "Host {host} is no longer active after session loss while processing request \
         {request_id}; try another host"
    )]
    HostInactive { host: String, request_id: u64 },

    #[error("Request {request_id} to [{endpoint}] failed with status {status}: {body}")]
    Server { status: u16, endpoint: String, request_id: u64, body: String },

    #[error("Transport error talking to {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("No hosts available to process request {request_id}; check logs for previous errors")]
    ExhaustedHosts { request_id: u64 },

    #[error("Failed to establish a session with any of the host(s): {hosts}")]
    NoEndpoints { hosts: String },

    #[error(
        "No available endpoints: every configured host failed to re-establish a session. \
         This is a fatal error"
    )]
    TotalOutage {
        #[source]
        cause: Box<IngestError>,
    },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Client has been shut down")]
    Shutdown,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" with status {code}")).unwrap_or_default()
}

impl IngestError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::HostInactive { .. } => ErrorCategory::Session,
            Self::Server { .. } => ErrorCategory::Server,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::ExhaustedHosts { .. } | Self::NoEndpoints { .. } | Self::TotalOutage { .. } => {
                ErrorCategory::Exhausted
            }
            Self::InvalidEndpoint(_) | Self::Config(_) | Self::Serialization(_) => {
                ErrorCategory::Config
            }
            Self::Shutdown => ErrorCategory::Shutdown,
        }
    }

    /// Whether a batch that failed with this error may be retried against
    /// another host.
    pub fn should_failover(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Authentication
                | ErrorCategory::Session
                | ErrorCategory::Server
                | ErrorCategory::Transport
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Authentication { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;
