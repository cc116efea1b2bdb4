//! Attempt loop behaviour with scripted transports.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use futures_util::future::BoxFuture;

use req_dispatch::config::DispatchOptions;
use req_dispatch::transport::{
    OutboundRequest, Transport, TransportError, TransportErrorKind, TransportKind, TransportResult,
};
use req_dispatch::{CallOptions, Dispatcher};

mod common;
use common::RecordingSink;

type Step = Result<(u16, &'static str), TransportErrorKind>;

/// Transport replaying a fixed script, repeating the last step when exhausted.
struct Scripted {
    kind: TransportKind,
    steps: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<OutboundRequest>>,
}

impl Scripted {
    fn new(kind: TransportKind, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            steps: Mutex::new(steps.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    fn urls(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|r| r.url.clone()).collect()
    }
}

impl Transport for Scripted {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn send<'a>(
        &'a self,
        request: &'a OutboundRequest,
    ) -> BoxFuture<'a, Result<TransportResult, TransportError>> {
        self.seen.lock().unwrap().push(request.clone());
        let step = {
            let mut steps = self.steps.lock().unwrap();
            if steps.len() > 1 {
                steps.pop_front().unwrap()
            } else {
                *steps.front().unwrap()
            }
        };
        Box::pin(async move {
            match step {
                Ok((status, body)) => Ok(TransportResult {
                    status: StatusCode::from_u16(status).unwrap(),
                    headers: HeaderMap::new(),
                    body: Bytes::from_static(body.as_bytes()),
                }),
                Err(kind) => Err(TransportError::new(kind, "scripted failure")),
            }
        })
    }
}

fn build(
    options: DispatchOptions,
    local: Arc<Scripted>,
    remote: Arc<Scripted>,
) -> (Dispatcher, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let dispatcher = Dispatcher::builder(options)
        .local(local)
        .remote(remote)
        .sink(sink.clone())
        .build();
    (dispatcher, sink)
}

#[tokio::test]
async fn test_routing_by_target_shape() {
    let local = Scripted::new(TransportKind::Local, vec![Ok((200, "{}"))]);
    let remote = Scripted::new(TransportKind::Remote, vec![Ok((200, "{}"))]);
    let (dispatcher, _) = build(DispatchOptions::default(), local.clone(), remote.clone());

    for target in ["/a", "/b/c?d=1", "/"] {
        dispatcher.get(target, None).await.unwrap();
    }
    for target in ["http://example.test/a", "https://example.test:8443/b"] {
        dispatcher.get(target, None).await.unwrap();
    }

    assert_eq!(local.calls(), 3);
    assert_eq!(remote.calls(), 2);
}

#[tokio::test]
async fn test_fails_twice_then_succeeds() {
    let local = Scripted::new(
        TransportKind::Local,
        vec![Ok((500, "{}")), Ok((503, "{}")), Ok((200, r#"{"done":true}"#))],
    );
    let remote = Scripted::new(TransportKind::Remote, vec![Ok((200, "{}"))]);
    let (dispatcher, sink) = build(DispatchOptions::default(), local.clone(), remote);

    let reply = dispatcher
        .get("/x", CallOptions::new().max_retries(2))
        .await
        .unwrap();
    assert_eq!(reply.payload()["done"], true);
    assert_eq!(local.calls(), 3);
    assert_eq!(local.urls(), vec!["/x", "/x", "/x"]);
    assert_eq!(sink.messages(), vec!["Retry #1: GET /x", "Retry #2: GET /x"]);
}

#[tokio::test]
async fn test_always_failing_stops_after_limit() {
    for max_retries in [0u32, 1, 4] {
        let local = Scripted::new(TransportKind::Local, vec![Ok((502, "{}"))]);
        let remote = Scripted::new(TransportKind::Remote, vec![Ok((200, "{}"))]);
        let (dispatcher, sink) = build(DispatchOptions::default(), local.clone(), remote);

        let err = dispatcher
            .get("/x", CallOptions::new().max_retries(max_retries))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 502);
        assert_eq!(local.calls(), max_retries as usize + 1);

        let max_logged = sink
            .messages()
            .iter()
            .filter(|m| m.starts_with("Max retries"))
            .count();
        assert_eq!(max_logged, if max_retries > 0 { 1 } else { 0 });
    }
}

#[tokio::test]
async fn test_transport_failure_is_retried() {
    let local = Scripted::new(TransportKind::Local, vec![Ok((200, "{}"))]);
    let remote = Scripted::new(
        TransportKind::Remote,
        vec![
            Err(TransportErrorKind::Timeout),
            Err(TransportErrorKind::Connect),
            Ok((200, r#"{"ok":1}"#)),
        ],
    );
    let (dispatcher, _) = build(
        DispatchOptions {
            max_retries: Some(2),
            ..Default::default()
        },
        local,
        remote.clone(),
    );

    let reply = dispatcher.get("http://example.test/", None).await.unwrap();
    assert_eq!(reply.payload()["ok"], 1);
    assert_eq!(remote.calls(), 3);
}

#[tokio::test]
async fn test_decode_failure_not_retried() {
    let local = Scripted::new(TransportKind::Local, vec![Ok((200, "<html>"))]);
    let remote = Scripted::new(TransportKind::Remote, vec![Ok((200, "{}"))]);
    let (dispatcher, _) = build(DispatchOptions::default(), local.clone(), remote);

    let err = dispatcher
        .get("/x", CallOptions::new().max_retries(3))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(local.calls(), 1);
}

#[tokio::test]
async fn test_timeout_default_and_plugin_override() {
    let local = Scripted::new(TransportKind::Local, vec![Ok((200, "{}"))]);
    let remote = Scripted::new(TransportKind::Remote, vec![Ok((200, "{}"))]);
    let (dispatcher, _) = build(DispatchOptions::default(), local, remote.clone());
    dispatcher.get("http://example.test/", None).await.unwrap();
    assert_eq!(
        remote.seen.lock().unwrap()[0].timeout,
        std::time::Duration::from_millis(5000)
    );

    let local = Scripted::new(TransportKind::Local, vec![Ok((200, "{}"))]);
    let remote = Scripted::new(TransportKind::Remote, vec![Ok((200, "{}"))]);
    let (dispatcher, _) = build(
        DispatchOptions {
            timeout_ms: Some(7000),
            ..Default::default()
        },
        local,
        remote.clone(),
    );
    dispatcher.get("http://example.test/", None).await.unwrap();
    assert_eq!(
        remote.seen.lock().unwrap()[0].timeout,
        std::time::Duration::from_millis(7000)
    );
}
