//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every dispatch attempt produces:
//!     → logging.rs (tagged log entries through a LogSink)
//!     → metrics.rs (call counters and latency histograms)
//!
//! Consumers:
//!     → tracing subscriber (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Log entries carry a tag set so hosts can filter slow calls from routine ones
//! - The sink is a capability injected at construction, never looked up globally
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use logging::{CallLog, LogData, LogSink, TracingSink};
