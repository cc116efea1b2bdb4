//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! OutboundRequest (method, url, headers, payload, timeout)
//!     → local.rs  (path-rooted: simulated exchange against the host Router)
//!     → remote.rs (absolute URL: real HTTP call via reqwest)
//!     → TransportResult {status, headers, body} or TransportError
//! ```
//!
//! # Design Decisions
//! - Non-success statuses are normal results; only network-level problems are errors
//! - Transports never decode bodies; the response normalizer owns that
//! - Object-safe trait so the executor can hold either transport behind `Arc<dyn>`

pub mod local;
pub mod remote;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use futures_util::future::BoxFuture;

use crate::dispatch::options::{Payload, Verb};

pub use local::LocalTransport;
pub use remote::RemoteTransport;

/// Which transport served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Local,
    Remote,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Local => "local",
            TransportKind::Remote => "remote",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outbound attempt handed to a transport.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub verb: Verb,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Payload>,
    pub timeout: Duration,
}

/// Raw result of a completed exchange.
#[derive(Debug, Clone)]
pub struct TransportResult {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResult {
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Canonical reason phrase, e.g. "Not Found".
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown Status")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Category of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    /// The request could not be built (bad URI, invalid header); never sent.
    InvalidRequest,
    Other,
}

/// Network-level failure reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?} failure: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Gateway-style status synthesized for the failure.
    pub fn status(&self) -> StatusCode {
        match self.kind {
            TransportErrorKind::Connect => StatusCode::BAD_GATEWAY,
            TransportErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            TransportErrorKind::InvalidRequest | TransportErrorKind::Other => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// A request that could not be built fails the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        self.kind != TransportErrorKind::InvalidRequest
    }

    pub fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    pub fn status_text(&self) -> &'static str {
        self.status().canonical_reason().unwrap_or("Internal Server Error")
    }
}

/// Performs one exchange for the executor.
pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    fn send<'a>(
        &'a self,
        request: &'a OutboundRequest,
    ) -> BoxFuture<'a, Result<TransportResult, TransportError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_statuses() {
        let timeout = TransportError::new(TransportErrorKind::Timeout, "elapsed");
        assert_eq!(timeout.status_code(), 504);
        assert_eq!(timeout.status_text(), "Gateway Timeout");

        let other = TransportError::new(TransportErrorKind::Other, "reset");
        assert_eq!(other.status_code(), 500);
        assert!(other.is_retryable());

        let invalid = TransportError::new(TransportErrorKind::InvalidRequest, "invalid uri character");
        assert_eq!(invalid.status_code(), 500);
        assert!(!invalid.is_retryable());
    }
}
