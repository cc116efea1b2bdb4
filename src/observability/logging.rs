//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binaries
//! - Define the tagged log capability used by the dispatch layer
//! - Forward tagged entries to `tracing` with structured fields
//!
//! # Design Decisions
//! - Entries tagged `warning` are emitted at WARN, everything else at INFO
//! - Log level configurable via config and `RUST_LOG`

use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const TAG_INFO: &str = "info";
pub const TAG_WARNING: &str = "warning";
pub const TAG_SLOW: &str = "slow";

/// Fields recorded for a single dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLog {
    pub url: String,
    pub status_code: u16,
    /// Elapsed milliseconds for the attempt.
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u64>,
    /// URL of the inbound request the call was made from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_url: Option<String>,
}

/// Payload of a log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogData {
    Call(CallLog),
    Message(String),
}

/// Destination for tagged log entries.
pub trait LogSink: Send + Sync {
    fn log(&self, tags: &[&str], data: LogData);
}

/// Default sink writing through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, tags: &[&str], data: LogData) {
        let tag_list = tags.join(",");
        let warning = tags.contains(&TAG_WARNING);

        match data {
            LogData::Call(call) => {
                let request_url = call.request_url.as_deref().unwrap_or("");
                if warning {
                    tracing::warn!(
                        tags = %tag_list,
                        url = %call.url,
                        status_code = call.status_code,
                        duration = call.duration,
                        threshold = ?call.threshold,
                        request_url = %request_url,
                        "Slow dispatch call"
                    );
                } else {
                    tracing::info!(
                        tags = %tag_list,
                        url = %call.url,
                        status_code = call.status_code,
                        duration = call.duration,
                        request_url = %request_url,
                        "Dispatch call"
                    );
                }
            }
            LogData::Message(message) => {
                if warning {
                    tracing::warn!(tags = %tag_list, "{}", message);
                } else {
                    tracing::info!(tags = %tag_list, "{}", message);
                }
            }
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str) {
    let default_filter = format!("req_dispatch={level},tower_http={level}");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
