//! Request execution: the retry loop around single transport attempts.

use crate::client::endpoint::RequestSpec;
use crate::client::policy::{Decision, Outcome, RetryStrategy};
use crate::transport::{HttpTransport, ProgressFn, RawResponse, TransportError};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Per-call summary reported once a terminal outcome is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStats {
    pub method: String,
    pub endpoint: String,
    /// Final HTTP status, absent when the call ended in a transport error.
    pub http_status: Option<u16>,
    /// Attempts made, including the first one.
    pub attempts: u32,
    pub duration_ms: u128,
    pub client_request_id: String,
    pub upstream_request_id: Option<String>,
}

/// Drives attempts for one request until the retry strategy says stop.
///
/// Holds only shared, read-only state; every `execute` call owns its own
/// attempt counter, so concurrent calls never coordinate.
#[derive(Clone)]
pub struct Executor {
    transport: Arc<HttpTransport>,
    strategy: Arc<dyn RetryStrategy>,
}

impl Executor {
    pub fn new(transport: Arc<HttpTransport>, strategy: Arc<dyn RetryStrategy>) -> Self {
        Self {
            transport,
            strategy,
        }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Run attempts sequentially. Returns the terminal response (success or a
    /// non-retried HTTP failure) or the terminal transport error.
    ///
    /// Cancelling `cancel` aborts the in-flight attempt or pending backoff sleep.
    pub async fn execute(
        &self,
        spec: &RequestSpec,
        progress: Option<ProgressFn>,
        cancel: &CancellationToken,
    ) -> Result<(RawResponse, CallStats), TransportError> {
        let client_request_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        let mut attempt: u32 = 1;

        loop {
            debug!(
                method = %spec.method,
                endpoint = spec.path.as_str(),
                attempt,
                client_request_id = client_request_id.as_str(),
                "sending request"
            );

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(TransportError::cancelled()),
                r = self.transport.send(spec, progress.clone(), &client_request_id) => r,
            };

            let decision = match &result {
                Ok(raw) if raw.is_success() => Decision::Stop,
                Ok(raw) => self.strategy.decide(Outcome::Status(raw.status), attempt),
                Err(e) if cancel.is_cancelled() => {
                    debug!(error = %e, "request cancelled");
                    Decision::Stop
                }
                Err(e) => self.strategy.decide(Outcome::Transport(e.kind()), attempt),
            };

            match decision {
                Decision::Retry { delay } => {
                    let reason = match &result {
                        Ok(raw) => format!("http {}", raw.status),
                        Err(e) => e.kind().to_string(),
                    };
                    warn!(
                        method = %spec.method,
                        endpoint = spec.path.as_str(),
                        attempt,
                        delay_ms = delay.as_millis(),
                        reason = reason.as_str(),
                        "retrying request"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(TransportError::cancelled()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    attempt = attempt.saturating_add(1);
                }
                Decision::Stop => {
                    let duration_ms = start.elapsed().as_millis();
                    return match result {
                        Ok(raw) => {
                            info!(
                                method = %spec.method,
                                endpoint = spec.path.as_str(),
                                http_status = raw.status,
                                attempts = attempt,
                                duration_ms,
                                "request finished"
                            );
                            let stats = CallStats {
                                method: spec.method.to_string(),
                                endpoint: spec.path.clone(),
                                http_status: Some(raw.status),
                                attempts: attempt,
                                duration_ms,
                                client_request_id,
                                upstream_request_id: raw.upstream_request_id.clone(),
                            };
                            Ok((raw, stats))
                        }
                        Err(e) => {
                            info!(
                                method = %spec.method,
                                endpoint = spec.path.as_str(),
                                error_kind = e.kind().as_str(),
                                attempts = attempt,
                                duration_ms,
                                "request failed"
                            );
                            Err(e)
                        }
                    };
                }
            }
        }
    }
}
