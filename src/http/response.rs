//! Response normalization.
//!
//! # Responsibilities
//! - Map a raw transport result to a decoded payload or a CallError
//! - Apply the JSON decoding mode
//! - Wrap the raw result alongside the payload when requested
//!
//! # Design Decisions
//! - Status >= 400 is a failure for both transports
//! - Error message comes from the body's `message` field, else the status text
//! - Empty bodies decode to `null` in every mode

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dispatch::error::CallError;
use crate::dispatch::options::JsonMode;
use crate::transport::TransportResult;

/// Successful call result.
#[derive(Debug, Clone)]
pub enum Reply {
    Payload(Value),
    /// Raw transport result plus payload, returned when `return_response` is set.
    Full {
        result: TransportResult,
        payload: Value,
    },
}

impl Reply {
    pub fn payload(&self) -> &Value {
        match self {
            Reply::Payload(payload) | Reply::Full { payload, .. } => payload,
        }
    }

    pub fn into_payload(self) -> Value {
        match self {
            Reply::Payload(payload) | Reply::Full { payload, .. } => payload,
        }
    }

    pub fn result(&self) -> Option<&TransportResult> {
        match self {
            Reply::Payload(_) => None,
            Reply::Full { result, .. } => Some(result),
        }
    }

    /// Deserialize the payload into `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, CallError> {
        let payload = self.into_payload();
        let text = payload.to_string();
        serde_json::from_value(payload).map_err(|_| CallError::decode(text))
    }
}

fn decode(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
}

fn error_data(result: &TransportResult) -> Option<Value> {
    if result.body.is_empty() {
        return None;
    }
    Some(decode(&result.body).unwrap_or_else(|_| Value::String(result.body_text())))
}

/// Convert a raw transport result into the caller-visible outcome.
pub fn normalize(
    result: TransportResult,
    json: JsonMode,
    return_response: bool,
) -> Result<Reply, CallError> {
    if result.status_code() >= 400 {
        let data = error_data(&result);
        let message = data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| result.status_text().to_string());

        return Err(CallError::UpstreamStatus {
            status_code: result.status_code(),
            message,
            data,
        });
    }

    let payload = match json {
        _ if result.body.is_empty() => Value::Null,
        JsonMode::Off => Value::String(result.body_text()),
        JsonMode::On => decode(&result.body).unwrap_or_else(|_| Value::String(result.body_text())),
        JsonMode::Force => decode(&result.body).map_err(|_| CallError::decode(result.body_text()))?,
    };

    if return_response {
        Ok(Reply::Full { result, payload })
    } else {
        Ok(Reply::Payload(payload))
    }
}
