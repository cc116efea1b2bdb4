//! Caller-visible error taxonomy.
//!
//! Every failure leaving the dispatcher is a [`CallError`] carrying a numeric
//! status, a message and optional data, whichever transport served the call.

use serde_json::Value;
use thiserror::Error;

use crate::transport::TransportError;

pub const INVALID_JSON_MESSAGE: &str = "returned payload was not valid JSON";

/// Errors returned by dispatch calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// Transport failure (connect refused, timeout, unbuildable request).
    #[error("{message}")]
    Transport {
        status_code: u16,
        message: String,
        #[source]
        cause: TransportError,
    },

    /// Non-success status from either transport.
    #[error("{message}")]
    UpstreamStatus {
        status_code: u16,
        message: String,
        data: Option<Value>,
    },

    /// Response body was not JSON while decoding was mandatory.
    #[error("{message}")]
    Decode { message: String, data: String },

    /// The target could not be routed to either transport.
    #[error("invalid target '{target}': {reason}")]
    Configuration { target: String, reason: String },
}

impl CallError {
    pub fn decode(body: impl Into<String>) -> Self {
        CallError::Decode {
            message: INVALID_JSON_MESSAGE.to_string(),
            data: body.into(),
        }
    }

    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        CallError::Configuration {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            CallError::Transport { status_code, .. } => *status_code,
            CallError::UpstreamStatus { status_code, .. } => *status_code,
            CallError::Decode { .. } => 400,
            CallError::Configuration { .. } => 500,
        }
    }

    pub fn message(&self) -> String {
        match self {
            CallError::Transport { message, .. }
            | CallError::UpstreamStatus { message, .. }
            | CallError::Decode { message, .. } => message.clone(),
            CallError::Configuration { .. } => self.to_string(),
        }
    }

    pub fn data(&self) -> Option<Value> {
        match self {
            CallError::UpstreamStatus { data, .. } => data.clone(),
            CallError::Decode { data, .. } => Some(Value::String(data.clone())),
            CallError::Transport { cause, .. } => Some(Value::String(cause.message.clone())),
            CallError::Configuration { .. } => None,
        }
    }

    /// Sent-but-failed transport calls and upstream 5xx are retried; nothing else is.
    pub fn is_retryable(&self) -> bool {
        match self {
            CallError::Transport { cause, .. } => cause.is_retryable(),
            CallError::UpstreamStatus { status_code, .. } => *status_code >= 500,
            CallError::Decode { .. } | CallError::Configuration { .. } => false,
        }
    }
}

impl From<TransportError> for CallError {
    fn from(err: TransportError) -> Self {
        CallError::Transport {
            status_code: err.status_code(),
            message: err.status_text().to_string(),
            cause: err,
        }
    }
}
