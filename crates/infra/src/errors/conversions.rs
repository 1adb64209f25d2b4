//! Conversions from external infrastructure errors into domain errors.

use ingestlink_domain::IngestError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub IngestError);

impl From<InfraError> for IngestError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<IngestError> for InfraError {
    fn from(value: IngestError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → IngestError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let endpoint = err.url().map(ToString::to_string).unwrap_or_default();
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else if err.is_builder() {
            return InfraError(IngestError::InvalidEndpoint(format!("invalid request: {err}")));
        } else if err.is_body() || err.is_decode() {
            format!("response body error: {err}")
        } else {
            err.to_string()
        };
        InfraError(IngestError::Transport { endpoint, message })
    }
}

/* -------------------------------------------------------------------------- */
/* config parse errors → IngestError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(err: toml::de::Error) -> Self {
        InfraError(IngestError::Config(format!("Invalid TOML format: {err}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        InfraError(IngestError::Config(format!("Failed to read config file: {err}")))
    }
}
