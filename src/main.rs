//! Demo host for the request dispatcher.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────┐
//!     ────────────────────┼─▶ context middleware ─▶ route handler        │
//!                         │                              │               │
//!                         │                              ▼               │
//!                         │                     Dispatcher (scoped)      │
//!                         │                       │              │       │
//!                         │          "/path"      ▼              ▼  "http://…"
//!                         │              LocalTransport   RemoteTransport ┼──▶ External
//!                         │              (same Router)       (reqwest)    │     Host
//!                         └──────────────────────────────────────────────┘
//! ```
//!
//! Usage: `req-dispatch [CONFIG_PATH]` (default `dispatch.toml`; built-in
//! defaults when the file does not exist).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use req_dispatch::config::{load_config, DispatchConfig};
use req_dispatch::observability::{logging, metrics};
use req_dispatch::{CallError, CallOptions, Dispatcher, RequestContext};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dispatch.toml"));

    let config = if path.exists() {
        load_config(&path)?
    } else {
        DispatchConfig::default()
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("req-dispatch v0.1.0 starting");
    tracing::info!(
        path = %path.display(),
        bind_address = %config.server.bind_address,
        local_prefix = ?config.dispatch.local_prefix,
        max_retries = ?config.dispatch.max_retries,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let routes = Router::new()
        .route("/health", get(health))
        .route("/echo", get(echo))
        .route("/aggregate", get(aggregate));

    let (app, _dispatcher) = req_dispatch::install(routes, &config);
    let app = app
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Echo query parameters and headers back as JSON.
async fn echo(Query(query): Query<BTreeMap<String, String>>, headers: HeaderMap) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
        .collect();
    Json(json!({ "query": query, "headers": headers }))
}

/// Fan out to local routes, and to `?remote=<url>` when given.
async fn aggregate(
    Extension(dispatcher): Extension<Dispatcher>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Response {
    let scoped = dispatcher.scoped(&ctx);

    let health = scoped.get("/health", None);
    let echo = scoped.get("/echo", CallOptions::new().query("from", "aggregate"));
    let (health, echo) = tokio::join!(health, echo);

    let remote = match query.get("remote") {
        Some(url) => Some(scoped.get(url, CallOptions::new().max_retries(1)).await),
        None => None,
    };

    let result = (|| -> Result<Value, CallError> {
        Ok(json!({
            "health": health?.into_payload(),
            "echo": echo?.into_payload(),
            "remote": remote.transpose()?.map(|r| r.into_payload()),
            "timings": ctx.timing.as_ref().map(|t| t.snapshot()),
        }))
    })();

    match result {
        Ok(body) => Json(body).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: CallError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
    let body = json!({
        "statusCode": err.status_code(),
        "message": err.message(),
        "data": err.data(),
    });
    (status, Json(body)).into_response()
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
