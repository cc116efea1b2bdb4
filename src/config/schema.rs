//! Configuration schema definitions.
//!
//! This module defines the plugin-wide dispatch options plus the settings the
//! demo host needs. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

use crate::dispatch::options::{JsonMode, SlowThreshold};

/// Name under which call timings are recorded when none is configured.
pub const DEFAULT_NAME: &str = "req-dispatch";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Plugin-wide dispatch options.
    pub dispatch: DispatchOptions,

    /// Demo host server settings.
    pub server: ServerConfig,

    /// Per-inbound-request timing sessions.
    pub timing: TimingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Plugin-wide dispatch options.
///
/// Unset fields fall through to the per-call options or the built-in defaults,
/// see [`crate::dispatch::options::merge`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Dependency name used as the timing bag key.
    pub name: String,

    /// Prepended to every local (path-rooted) target.
    pub local_prefix: Option<String>,

    /// Maximum number of retries after the first attempt.
    pub max_retries: Option<u32>,

    /// Remote call timeout in milliseconds.
    pub timeout_ms: Option<u64>,

    /// Slow-call threshold for in-process calls (`false` disables).
    pub slow_warning_local: Option<SlowThreshold>,

    /// Slow-call threshold for remote calls (`false` disables).
    pub slow_warning_remote: Option<SlowThreshold>,

    /// Log every call, not only slow ones.
    pub verbose: Option<bool>,

    /// Response decoding mode.
    pub json: Option<JsonMode>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            local_prefix: None,
            max_retries: None,
            timeout_ms: None,
            slow_warning_local: None,
            slow_warning_remote: None,
            verbose: None,
            json: None,
        }
    }
}

/// Demo host server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Inbound request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Timing session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Open a timing session on every inbound request.
    pub enabled: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
