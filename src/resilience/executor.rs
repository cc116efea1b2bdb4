//! The attempt loop around a resolved call.
//!
//! # State Transitions
//! ```text
//! Attempting(n) → transport ok, status < 400      → Succeeded
//! Attempting(n) → retryable failure, n < max      → Attempting(n + 1)
//! Attempting(n) → otherwise                        → Failed
//! ```
//!
//! Each attempt is timed on its own. After every attempt the executor records
//! metrics, writes the timing bag and emits the slow or verbose log entry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::dispatch::error::CallError;
use crate::dispatch::target::CallRequest;
use crate::http::request::RequestContext;
use crate::http::response::{normalize, Reply};
use crate::observability::logging::{CallLog, LogData, LogSink, TAG_INFO, TAG_SLOW, TAG_WARNING};
use crate::observability::metrics;
use crate::resilience::retries::{max_retries_message, retry_message, RetryPolicy};
use crate::transport::{Transport, TransportError, TransportKind, TransportResult};

/// Runs calls through the matching transport with retries and logging.
#[derive(Clone)]
pub struct Executor {
    local: Arc<dyn Transport>,
    remote: Arc<dyn Transport>,
    sink: Arc<dyn LogSink>,
    /// Timing bag key.
    name: String,
}

impl Executor {
    pub fn new(
        local: Arc<dyn Transport>,
        remote: Arc<dyn Transport>,
        sink: Arc<dyn LogSink>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            local,
            remote,
            sink,
            name: name.into(),
        }
    }

    fn transport(&self, kind: TransportKind) -> &dyn Transport {
        match kind {
            TransportKind::Local => self.local.as_ref(),
            TransportKind::Remote => self.remote.as_ref(),
        }
    }

    /// Execute `request` until it succeeds or retries are exhausted.
    pub async fn execute(
        &self,
        request: CallRequest,
        context: Option<&RequestContext>,
    ) -> Result<Reply, CallError> {
        let policy = RetryPolicy::new(request.options.max_retries);
        let mut request = request;

        loop {
            let outcome = self.attempt(&request, context).await;

            match outcome {
                Ok(reply) => return Ok(reply),
                Err(err) if policy.should_retry(&err, request.attempt) => {
                    let next = request.next_attempt();
                    self.sink.log(
                        &[TAG_INFO],
                        LogData::Message(retry_message(next.attempt, request.verb, &request.url)),
                    );
                    tracing::debug!(
                        attempt = next.attempt,
                        max_attempts = policy.max_attempts(),
                        method = %request.verb,
                        url = %request.url,
                        status_code = err.status_code(),
                        "Retrying dispatch call"
                    );
                    request = next;
                }
                Err(err) => {
                    if policy.max_retries > 0 && request.attempt > 0 {
                        self.sink.log(
                            &[TAG_INFO],
                            LogData::Message(max_retries_message(request.verb, &request.url)),
                        );
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &CallRequest,
        context: Option<&RequestContext>,
    ) -> Result<Reply, CallError> {
        let transport = self.transport(request.transport);
        let outbound = request.outbound();
        tracing::trace!(
            transport = %transport.kind(),
            method = %request.verb,
            url = %request.url,
            attempt = request.attempt,
            "Dispatch attempt"
        );

        let started = Instant::now();
        let raw = transport.send(&outbound).await;
        let elapsed = started.elapsed();

        self.observe(request, context, &raw, elapsed);

        let result = raw?;
        normalize(result, request.options.json, request.options.return_response)
    }

    fn observe(
        &self,
        request: &CallRequest,
        context: Option<&RequestContext>,
        raw: &Result<TransportResult, TransportError>,
        elapsed: Duration,
    ) {
        let status_code = match raw {
            Ok(result) => result.status_code(),
            Err(err) => err.status_code(),
        };
        let duration = elapsed.as_millis() as u64;

        metrics::record_call(request.transport.as_str(), request.verb.as_str(), status_code, elapsed);

        if let Some(bag) = context.and_then(|c| c.timing.as_ref()) {
            bag.record(&self.name, duration);
        }

        let threshold = match request.transport {
            TransportKind::Local => request.options.slow_warning_local,
            TransportKind::Remote => request.options.slow_warning_remote,
        };

        let entry = CallLog {
            url: request.url.clone(),
            status_code,
            duration,
            threshold: None,
            request_url: context.map(|c| c.url.clone()),
        };

        match threshold {
            Some(limit) if duration > limit => {
                self.sink.log(
                    &[TAG_WARNING, TAG_SLOW],
                    LogData::Call(CallLog {
                        threshold: Some(limit),
                        ..entry
                    }),
                );
            }
            _ if request.options.verbose => {
                self.sink.log(&[TAG_INFO], LogData::Call(entry));
            }
            _ => {}
        }
    }
}
