//! Remote dispatch over a real HTTP client.
//!
//! # Responsibilities
//! - Issue the outbound call with the per-attempt timeout
//! - Return status, headers and body exactly as received
//! - Classify client failures as connect, timeout, invalid request or other
//!
//! # Design Decisions
//! - One pooled `reqwest::Client` shared by all calls
//! - Timeout applies to the whole exchange including the body read

use futures_util::future::BoxFuture;
use reqwest::Client;

use super::{OutboundRequest, Transport, TransportError, TransportErrorKind, TransportKind, TransportResult};

/// Outbound HTTP transport backed by `reqwest`.
#[derive(Clone, Default)]
pub struct RemoteTransport {
    client: Client,
}

impl RemoteTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn classify(err: &reqwest::Error) -> TransportErrorKind {
    if err.is_builder() {
        TransportErrorKind::InvalidRequest
    } else if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    TransportError::new(classify(&err), err.to_string())
}

impl Transport for RemoteTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Remote
    }

    fn send<'a>(
        &'a self,
        request: &'a OutboundRequest,
    ) -> BoxFuture<'a, Result<TransportResult, TransportError>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.verb.method(), request.url.as_str())
                .timeout(request.timeout);

            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            if let Some(payload) = request.payload.as_ref().filter(|_| request.verb.carries_payload()) {
                if let Some(content_type) = payload.content_type() {
                    if !request.headers.contains_key("content-type") {
                        builder = builder.header("content-type", content_type);
                    }
                }
                builder = builder.body(payload.to_body());
            }

            let response = builder.send().await.map_err(|e| {
                tracing::debug!(url = %request.url, error = %e, "Remote call failed");
                transport_error(e)
            })?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(transport_error)?;

            Ok(TransportResult {
                status,
                headers,
                body,
            })
        })
    }
}
