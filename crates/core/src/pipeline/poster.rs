use std::sync::Arc;

use tracing::{debug, warn};

use ingestlink_domain::constants::{ECHO_DISABLED_PARAM, PIPELINE_CHARSET, PIPELINE_DOC_CONTENT_TYPE};
use ingestlink_domain::{HostKey, IngestError, Result};

use super::batch::PipelineBatch;
use crate::session::{Session, SessionManager};
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Submission URL for `path` on `host` with `echo=false` merged into the
/// query string
pub fn pipeline_url(host: &HostKey, path: &str) -> String {
    let url = host.join(path);
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{ECHO_DISABLED_PARAM}")
}

/// Issues authenticated requests to a single host
#[derive(Debug)]
pub struct PipelinePoster {
    transport: Arc<dyn Transport>,
    sessions: Arc<SessionManager>,
}

impl PipelinePoster {
    pub fn new(transport: Arc<dyn Transport>, sessions: Arc<SessionManager>) -> Self {
        Self { transport, sessions }
    }

    /// Post `batch` to `path` on `host`.
    ///
    /// A 401 re-establishes the session once and re-issues the identical
    /// request; that second outcome is final.
    ///
    /// # Errors
    /// - [`IngestError::HostInactive`] if the session cannot be
    ///   re-established
    /// - [`IngestError::Server`] for any status other than 200/204
    /// - [`IngestError::Transport`] for network failures
    pub fn post(
        &self,
        host: &HostKey,
        path: &str,
        batch: &PipelineBatch,
        request_id: u64,
    ) -> Result<()> {
        let session = self.sessions.get(host, request_id)?;
        let url = pipeline_url(host, path);
        let request = TransportRequest::post(url.clone())
            .with_header(
                "Content-Type",
                format!("{PIPELINE_DOC_CONTENT_TYPE}; charset={PIPELINE_CHARSET}"),
            )
            .with_body(batch.body());

        let response = self.execute(host, &request)?;
        let (session, response) = if response.status() == 401 {
            self.reauthenticate_and_retry(host, &request, response, request_id)?
        } else {
            (session, response)
        };

        Self::finish_post(response, &session, &url, batch, request_id)
    }

    fn finish_post(
        mut response: TransportResponse,
        session: &Session,
        url: &str,
        batch: &PipelineBatch,
        request_id: u64,
    ) -> Result<()> {
        match response.status() {
            200 | 204 => {
                response.drain();
                session.mark_sent(batch.len());
                debug!(endpoint = %url, request_id, documents = batch.len(), "Batch accepted");
                Ok(())
            }
            status => Err(IngestError::Server {
                status,
                endpoint: url.to_string(),
                request_id,
                body: response.read_text(),
            }),
        }
    }

    /// Send an arbitrary request to the host its URL names.
    ///
    /// With `retry`, a 401 re-establishes the session once and re-issues the
    /// request. Any non-2xx outcome is surfaced as an error; on success the
    /// caller owns the response body.
    ///
    /// # Errors
    /// As [`PipelinePoster::post`], plus [`IngestError::InvalidEndpoint`] if
    /// the request URL has no usable host.
    pub fn send(
        &self,
        request: &TransportRequest,
        retry: bool,
        request_id: u64,
    ) -> Result<TransportResponse> {
        let host = HostKey::from_url(&request.url)?;
        self.sessions.get(&host, request_id)?;

        let mut response = self.execute(&host, request)?;
        if retry && response.status() == 401 {
            let (_, retried) = self.reauthenticate_and_retry(&host, request, response, request_id)?;
            response = retried;
        }

        if response.is_success() {
            Ok(response)
        } else {
            Err(IngestError::Server {
                status: response.status(),
                endpoint: request.url.clone(),
                request_id,
                body: response.read_text(),
            })
        }
    }

    fn reauthenticate_and_retry(
        &self,
        host: &HostKey,
        request: &TransportRequest,
        mut unauthorized: TransportResponse,
        request_id: u64,
    ) -> Result<(Session, TransportResponse)> {
        unauthorized.drain();
        drop(unauthorized);
        warn!(host = %host, request_id, "Request unauthorized; re-establishing session");

        let session = self
            .sessions
            .reset(host)?
            .ok_or_else(|| IngestError::HostInactive { host: host.to_string(), request_id })?;
        let response = self.execute(host, request)?;
        Ok((session, response))
    }

    fn execute(&self, host: &HostKey, request: &TransportRequest) -> Result<TransportResponse> {
        let mut prepared = request.clone();
        self.sessions.authenticator().authorize(host, &mut prepared);
        self.sessions.store().attach_cookies(host, &mut prepared);

        let response = self.transport.execute(&prepared)?;
        self.sessions.store().capture_cookies(host, &response);
        Ok(response)
    }
}
