//! Inbound request context.
//!
//! # Responsibilities
//! - Capture the inbound URL and request ID for outbound referrer headers
//! - Open a timing session per inbound request when enabled
//! - Expose the context to handlers as a request extension
//!
//! # Design Decisions
//! - Request ID taken from `x-request-id` when present, otherwise UUID v4
//! - The context is an explicit value handed to the dispatcher, never ambient state

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::resilience::timing::TimingBag;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const REFERRER_HEADER: &str = "referrer";

/// Context of the inbound request a call is made on behalf of.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Inbound request URL (path and query).
    pub url: String,
    pub request_id: String,
    /// Active timing session, if any.
    pub timing: Option<TimingBag>,
}

impl RequestContext {
    pub fn new(url: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_id: request_id.into(),
            timing: None,
        }
    }

    pub fn with_timing(mut self, bag: TimingBag) -> Self {
        self.timing = Some(bag);
        self
    }

    /// Build a context from an inbound request.
    pub fn from_request(request: &Request<Body>, timing: bool) -> Self {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            url: request.uri().to_string(),
            request_id,
            timing: timing.then(TimingBag::start),
        }
    }
}

/// Settings for [`attach_context`].
#[derive(Debug, Clone, Copy)]
pub struct ContextSettings {
    pub timing: bool,
}

/// Middleware inserting a [`RequestContext`] into request extensions.
pub async fn attach_context(
    State(settings): State<ContextSettings>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let context = RequestContext::from_request(&request, settings.timing);
    request.extensions_mut().insert(context.clone());

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&context.request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    if let Some(bag) = &context.timing {
        let timings = bag.snapshot();
        if !timings.is_empty() {
            tracing::debug!(
                request_id = %context.request_id,
                url = %context.url,
                elapsed_ms = bag.started().elapsed().as_millis() as u64,
                timings = ?timings,
                "Dependency timings"
            );
        }
    }

    response
}
