//! Installation into a host axum application.
//!
//! # Responsibilities
//! - Build the Dispatcher from the plugin-wide options
//! - Attach the request-context middleware and `Extension<Dispatcher>`
//! - Bind the finished Router into the in-process transport
//!
//! Handlers then reach the dispatcher and their inbound context through
//! extractors:
//!
//! ```ignore
//! async fn handler(
//!     Extension(dispatcher): Extension<Dispatcher>,
//!     Extension(ctx): Extension<RequestContext>,
//! ) -> impl IntoResponse {
//!     dispatcher.scoped(&ctx).get("/health", None).await
//! }
//! ```

use std::sync::Arc;

use axum::{middleware, Extension, Router};

use crate::config::schema::DispatchConfig;
use crate::dispatch::client::{Dispatcher, DispatcherBuilder};
use crate::http::request::{attach_context, ContextSettings};
use crate::transport::LocalTransport;

/// Install the dispatcher into `router`.
///
/// Returns the router to serve and a handle for use outside request handlers.
pub fn install(router: Router, config: &DispatchConfig) -> (Router, Dispatcher) {
    install_with(router, config, |builder| builder)
}

/// Like [`install`], letting the caller adjust the dispatcher (remote transport,
/// log sink) before it is built.
pub fn install_with<F>(router: Router, config: &DispatchConfig, customize: F) -> (Router, Dispatcher)
where
    F: FnOnce(DispatcherBuilder) -> DispatcherBuilder,
{
    let local = LocalTransport::deferred();
    let builder = Dispatcher::builder(config.dispatch.clone()).local(Arc::new(local.clone()));
    let dispatcher = customize(builder).build();

    let settings = ContextSettings {
        timing: config.timing.enabled,
    };
    let router = router
        .layer(Extension(dispatcher.clone()))
        .layer(middleware::from_fn_with_state(settings, attach_context));

    local.bind(router.clone());

    tracing::debug!(
        name = %config.dispatch.name,
        local_prefix = ?config.dispatch.local_prefix,
        timing = settings.timing,
        "Dispatcher installed"
    );

    (router, dispatcher)
}
