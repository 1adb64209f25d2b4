use std::sync::Arc;

use tracing::{info, warn};

use ingestlink_common::{Clock, MetricsCollector};
use ingestlink_domain::constants::METRIC_POST_DURATION;
use ingestlink_domain::{HostKey, IngestError, Result, SessionConfig};

use super::batch::PipelineBatch;
use super::poster::PipelinePoster;
use crate::routing::HostSelector;
use crate::session::SessionManager;

/// Outcome of a successful batch submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReceipt {
    pub request_id: u64,
    /// Host that accepted the batch
    pub host: HostKey,
    /// Number of submission attempts, including the successful one
    pub attempts: u32,
    pub documents: usize,
}

/// Spreads a batch submission across live hosts.
///
/// Failed hosts are dropped from the local snapshot only; the shared session
/// table is untouched by a failed post.
#[derive(Debug)]
pub struct RetryCoordinator {
    sessions: Arc<SessionManager>,
    poster: Arc<PipelinePoster>,
    selector: Arc<HostSelector>,
    clock: Arc<dyn Clock>,
    settings: SessionConfig,
    metrics: Option<Arc<dyn MetricsCollector>>,
}

impl RetryCoordinator {
    pub fn new(
        sessions: Arc<SessionManager>,
        poster: Arc<PipelinePoster>,
        selector: Arc<HostSelector>,
        clock: Arc<dyn Clock>,
        settings: SessionConfig,
    ) -> Self {
        Self { sessions, poster, selector, clock, settings, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Submit `batch` to `path` on some live host.
    ///
    /// # Errors
    /// - [`IngestError::TotalOutage`] if no host can be re-established
    /// - the error of the last failed attempt once every option is spent
    /// - [`IngestError::ExhaustedHosts`] if hosts ran out without an error
    pub fn post_batch(
        &self,
        path: &str,
        batch: &PipelineBatch,
        request_id: u64,
    ) -> Result<BatchReceipt> {
        let live = self.sessions.live_hosts()?;
        let started = self.clock.now();

        let receipt = if live.len() > 1 {
            self.post_multi_host(live, path, batch, request_id)?
        } else {
            let host = live
                .into_iter()
                .next()
                .ok_or(IngestError::ExhaustedHosts { request_id })?;
            self.post_single_host(host, path, batch, request_id)?
        };

        if let Some(metrics) = &self.metrics {
            let elapsed = self.clock.elapsed_since(started).as_millis() as u64;
            metrics.record_timing(METRIC_POST_DURATION, elapsed, &[("host", receipt.host.as_str())]);
        }
        Ok(receipt)
    }

    fn post_multi_host(
        &self,
        mut live: Vec<HostKey>,
        path: &str,
        batch: &PipelineBatch,
        request_id: u64,
    ) -> Result<BatchReceipt> {
        let mut attempts = 0u32;
        let mut last_error: Option<IngestError> = None;

        loop {
            let Some(host) = self.selector.pick(&live) else {
                return Err(last_error.unwrap_or(IngestError::ExhaustedHosts { request_id }));
            };
            attempts += 1;

            match self.poster.post(&host, path, batch, request_id) {
                Ok(()) => {
                    if attempts > 1 {
                        info!(host = %host, request_id, attempts, "Batch accepted after retry");
                    }
                    return Ok(BatchReceipt { request_id, host, attempts, documents: batch.len() });
                }
                Err(err) if err.should_failover() => {
                    warn!(
                        host = %host,
                        request_id,
                        error = %err,
                        remaining = live.len() - 1,
                        "Batch failed on host; trying another"
                    );
                    live.retain(|candidate| candidate != &host);
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn post_single_host(
        &self,
        host: HostKey,
        path: &str,
        batch: &PipelineBatch,
        request_id: u64,
    ) -> Result<BatchReceipt> {
        match self.poster.post(&host, path, batch, request_id) {
            Ok(()) => Ok(BatchReceipt { request_id, host, attempts: 1, documents: batch.len() }),
            Err(err) if err.should_failover() => {
                let delay = self.settings.single_host_retry_delay();
                warn!(
                    host = %host,
                    request_id,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Batch failed on the only live host; retrying once"
                );
                self.clock.sleep(delay);
                self.poster.post(&host, path, batch, request_id)?;
                info!(host = %host, request_id, attempts = 2, "Batch accepted after retry");
                Ok(BatchReceipt { request_id, host, attempts: 2, documents: batch.len() })
            }
            Err(err) => Err(err),
        }
    }
}
