//! Per-call options and the precedence merge.
//!
//! # Precedence (low → high)
//! ```text
//! timeout, max_retries, local_prefix:      default < per-call < plugin-wide
//! json, verbose, slow_warning_*:           default < plugin-wide < per-call
//! query, headers, payload, return_response: per-call only
//! ```
//!
//! Merging never mutates either input; it produces a fresh [`ResolvedOptions`].

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use axum::http::Method;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::config::schema::DispatchOptions;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// HTTP verbs the dispatcher exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }

    /// Whether a payload is forwarded for this verb.
    pub fn carries_payload(self) -> bool {
        matches!(self, Verb::Post | Verb::Put | Verb::Patch)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "PATCH" => Ok(Verb::Patch),
            "DELETE" => Ok(Verb::Delete),
            other => Err(format!("unsupported method '{other}'")),
        }
    }
}

/// How the response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonMode {
    /// Return the body as a string, never decode.
    Off,
    /// Decode when possible, fall back to the raw string.
    On,
    /// Decode, failing with a 400 when the body is not JSON.
    #[default]
    Force,
}

/// Slow-call threshold: a millisecond limit or explicitly disabled.
///
/// Deserializes from an integer or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlowThreshold {
    Disabled,
    After(u64),
}

impl SlowThreshold {
    pub fn millis(self) -> Option<u64> {
        match self {
            SlowThreshold::Disabled => None,
            SlowThreshold::After(ms) => Some(ms),
        }
    }
}

impl From<u64> for SlowThreshold {
    fn from(ms: u64) -> Self {
        SlowThreshold::After(ms)
    }
}

impl<'de> Deserialize<'de> for SlowThreshold {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Millis(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(false) => Ok(SlowThreshold::Disabled),
            Repr::Flag(true) => Err(D::Error::custom(
                "slow-call threshold must be a number of milliseconds or false",
            )),
            Repr::Millis(ms) => Ok(SlowThreshold::After(ms)),
        }
    }
}

impl Serialize for SlowThreshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SlowThreshold::Disabled => serializer.serialize_bool(false),
            SlowThreshold::After(ms) => serializer.serialize_u64(*ms),
        }
    }
}

/// Outbound request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Serialized as JSON with `content-type: application/json`.
    Json(Value),
    /// Sent verbatim.
    Raw(String),
}

impl Payload {
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Payload::Json(_) => Some("application/json"),
            Payload::Raw(_) => None,
        }
    }

    pub fn to_body(&self) -> String {
        match self {
            Payload::Json(value) => value.to_string(),
            Payload::Raw(text) => text.clone(),
        }
    }
}

/// Options supplied with a single call. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    /// Appended to the target as a query string, in insertion order.
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Payload>,
    pub timeout: Option<Duration>,
    pub max_retries: Option<u32>,
    pub json: Option<JsonMode>,
    pub return_response: bool,
    pub slow_warning_local: Option<SlowThreshold>,
    pub slow_warning_remote: Option<SlowThreshold>,
    pub verbose: Option<bool>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn json_payload(mut self, value: Value) -> Self {
        self.payload = Some(Payload::Json(value));
        self
    }

    pub fn raw_payload(mut self, body: impl Into<String>) -> Self {
        self.payload = Some(Payload::Raw(body.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn json(mut self, mode: JsonMode) -> Self {
        self.json = Some(mode);
        self
    }

    pub fn return_response(mut self) -> Self {
        self.return_response = true;
        self
    }

    pub fn slow_warning_local(mut self, threshold: impl Into<SlowThreshold>) -> Self {
        self.slow_warning_local = Some(threshold.into());
        self
    }

    pub fn slow_warning_remote(mut self, threshold: impl Into<SlowThreshold>) -> Self {
        self.slow_warning_remote = Some(threshold.into());
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }
}

/// Fully merged options for one call chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Payload>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub json: JsonMode,
    pub return_response: bool,
    pub slow_warning_local: Option<u64>,
    pub slow_warning_remote: Option<u64>,
    pub verbose: bool,
    pub local_prefix: Option<String>,
}

/// Merge built-in defaults, per-call options and plugin-wide options.
pub fn merge(call: &CallOptions, plugin: &DispatchOptions) -> ResolvedOptions {
    let timeout = plugin
        .timeout_ms
        .map(Duration::from_millis)
        .or(call.timeout)
        .unwrap_or(Duration::from_millis(DEFAULT_TIMEOUT_MS));

    let threshold = |call: Option<SlowThreshold>, plugin: Option<SlowThreshold>| {
        call.or(plugin).and_then(SlowThreshold::millis)
    };

    ResolvedOptions {
        query: call.query.clone(),
        headers: call
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect(),
        payload: call.payload.clone(),
        timeout,
        max_retries: plugin.max_retries.or(call.max_retries).unwrap_or(0),
        json: call.json.or(plugin.json).unwrap_or_default(),
        return_response: call.return_response,
        slow_warning_local: threshold(call.slow_warning_local, plugin.slow_warning_local),
        slow_warning_remote: threshold(call.slow_warning_remote, plugin.slow_warning_remote),
        verbose: call.verbose.or(plugin.verbose).unwrap_or(false),
        local_prefix: plugin.local_prefix.clone(),
    }
}
