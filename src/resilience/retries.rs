//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a failed attempt is retryable
//! - Bound total attempts to `max_retries + 1`
//! - Format the retry and exhaustion notices
//!
//! # Design Decisions
//! - Transport failures and 5xx are retryable, 4xx never are
//! - Retries are immediate: no backoff, no jitter
//! - Decode and configuration errors are terminal

use crate::dispatch::error::CallError;
use crate::dispatch::options::Verb;

/// Bounded immediate-retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Whether another attempt follows `attempt` (zero-based) failing with `err`.
    pub fn should_retry(&self, err: &CallError, attempt: u32) -> bool {
        err.is_retryable() && attempt < self.max_retries
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

pub fn retry_message(retry: u32, verb: Verb, url: &str) -> String {
    format!("Retry #{retry}: {verb} {url}")
}

pub fn max_retries_message(verb: Verb, url: &str) -> String {
    format!("Max retries: {verb} {url}")
}
