//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_calls_total` (counter): attempts by transport, method, status
//! - `dispatch_call_duration_seconds` (histogram): per-attempt latency by transport
//!
//! # Design Decisions
//! - Recorded per attempt, so retries are visible as extra samples
//! - Exporter is optional; without it the `metrics` facade is a no-op

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Record a finished dispatch attempt.
pub fn record_call(transport: &'static str, method: &'static str, status: u16, elapsed: Duration) {
    metrics::counter!(
        "dispatch_calls_total",
        "transport" => transport,
        "method" => method,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("dispatch_call_duration_seconds", "transport" => transport)
        .record(elapsed.as_secs_f64());
}

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}
