//! Host HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → request.rs (RequestContext: url, request id, timing bag)
//!     → handler uses Dispatcher::scoped(&ctx)
//!     → ... transport ...
//!     → response.rs (status → Reply or CallError)
//! ```
//!
//! host.rs wires the middleware and the Dispatcher into an axum Router.

pub mod host;
pub mod request;
pub mod response;

pub use host::{install, install_with};
pub use request::{RequestContext, REFERRER_HEADER, X_REQUEST_ID};
pub use response::Reply;
