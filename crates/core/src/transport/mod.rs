//! Transport port
//!
//! The core never talks to the network directly. Every request goes through
//! a [`Transport`], which the infra crate implements on top of a pooled
//! blocking HTTP client.

mod request;
mod response;

use std::fmt::Debug;
use std::sync::Arc;

use ingestlink_domain::Result;

pub use request::{Method, TransportRequest};
pub use response::TransportResponse;

/// Executes HTTP requests.
///
/// Implementations must be safe to share between threads. Network-level
/// failures are reported as [`ingestlink_domain::IngestError::Transport`];
/// any HTTP status, including 4xx/5xx, is a successful execution.
pub trait Transport: Send + Sync + Debug {
    /// Execute one request and return the response with an unread body
    fn execute(&self, request: &TransportRequest) -> Result<TransportResponse>;

    /// Release pooled connections. Later calls to `execute` may fail.
    fn close(&self) {}
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &TransportRequest) -> Result<TransportResponse> {
        (**self).execute(request)
    }

    fn close(&self) {
        (**self).close();
    }
}
