//! In-process dispatch against the host's own route table.
//!
//! # Responsibilities
//! - Turn an OutboundRequest into an `http::Request` and drive it through the Router
//! - Collect status, headers and body without touching a socket
//!
//! # Design Decisions
//! - The Router is bound after construction so handlers inside it can hold a
//!   Dispatcher that dispatches back into the same Router
//! - No timeout: the exchange always completes

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{header, Request};
use axum::Router;
use futures_util::future::BoxFuture;
use tower::ServiceExt;

use super::{OutboundRequest, Transport, TransportError, TransportErrorKind, TransportKind, TransportResult};

/// Simulated HTTP exchange against an axum Router.
#[derive(Clone, Default)]
pub struct LocalTransport {
    router: Arc<OnceLock<Router>>,
}

impl LocalTransport {
    /// Transport over an already-built router.
    pub fn new(router: Router) -> Self {
        let transport = Self::deferred();
        transport.bind(router);
        transport
    }

    /// Transport whose router is supplied later via [`LocalTransport::bind`].
    pub fn deferred() -> Self {
        Self::default()
    }

    /// Bind the router. Returns false if one was already bound.
    pub fn bind(&self, router: Router) -> bool {
        self.router.set(router).is_ok()
    }

    pub fn is_bound(&self) -> bool {
        self.router.get().is_some()
    }

    fn build_request(request: &OutboundRequest) -> Result<Request<Body>, TransportError> {
        let mut builder = Request::builder()
            .method(request.verb.method())
            .uri(request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = match &request.payload {
            Some(payload) if request.verb.carries_payload() => {
                if let Some(content_type) = payload.content_type() {
                    if !request.headers.contains_key(header::CONTENT_TYPE.as_str()) {
                        builder = builder.header(header::CONTENT_TYPE, content_type);
                    }
                }
                Body::from(payload.to_body())
            }
            _ => Body::empty(),
        };

        builder
            .body(body)
            .map_err(|e| TransportError::new(TransportErrorKind::InvalidRequest, e.to_string()))
    }
}

impl Transport for LocalTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Local
    }

    fn send<'a>(
        &'a self,
        request: &'a OutboundRequest,
    ) -> BoxFuture<'a, Result<TransportResult, TransportError>> {
        Box::pin(async move {
            let router = self.router.get().cloned().ok_or_else(|| {
                TransportError::new(TransportErrorKind::Other, "in-process router not bound")
            })?;

            let req = Self::build_request(request)?;
            let response = match router.oneshot(req).await {
                Ok(response) => response,
                Err(never) => match never {},
            };

            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX)
                .await
                .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?;

            Ok(TransportResult {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};

    use crate::dispatch::options::{Payload, Verb};

    fn outbound(verb: Verb, url: &str) -> OutboundRequest {
        OutboundRequest {
            verb,
            url: url.to_string(),
            headers: BTreeMap::new(),
            payload: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_unbound_router_fails() {
        let transport = LocalTransport::deferred();
        let err = transport.send(&outbound(Verb::Get, "/x")).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_headers_and_payload_reach_handler() {
        let router = Router::new()
            .route(
                "/mine",
                get(|headers: HeaderMap| async move {
                    headers
                        .get("mine")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                }),
            )
            .route("/echo", post(|body: String| async move { body }));
        let transport = LocalTransport::new(router);

        let mut req = outbound(Verb::Get, "/mine");
        req.headers.insert("mine".into(), "header".into());
        let res = transport.send(&req).await.unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body_text(), "header");

        let mut req = outbound(Verb::Post, "/echo");
        req.payload = Some(Payload::Raw("hello".into()));
        let res = transport.send(&req).await.unwrap();
        assert_eq!(res.body_text(), "hello");
    }

    #[tokio::test]
    async fn test_missing_route_is_a_result_not_an_error() {
        let transport = LocalTransport::new(Router::new());
        let res = transport.send(&outbound(Verb::Get, "/literal")).await.unwrap();
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_request_is_invalid() {
        let transport = LocalTransport::new(Router::new());
        let err = transport.send(&outbound(Verb::Get, "/a b")).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::InvalidRequest);

        let mut req = outbound(Verb::Get, "/literal");
        req.headers.insert("mine".into(), "bad\nvalue".into());
        let err = transport.send(&req).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::InvalidRequest);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_bind_only_once() {
        let transport = LocalTransport::deferred();
        assert!(!transport.is_bound());
        assert!(transport.bind(Router::new()));
        assert!(!transport.bind(Router::new()));
        assert!(transport.is_bound());
    }
}
