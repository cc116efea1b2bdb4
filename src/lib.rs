//! Request dispatch for axum applications.
//!
//! One call surface (`get`, `post`, `put`, `patch`, `delete`) that serves
//! path-rooted targets by driving the application's own Router in-process and
//! absolute URLs over the network, with uniform decoding, error mapping,
//! retries, timing and slow-call logging.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use config::DispatchConfig;
pub use dispatch::{CallError, CallOptions, Dispatcher, JsonMode, Verb};
pub use http::{install, Reply, RequestContext};
