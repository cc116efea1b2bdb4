//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! verb(target, options)
//!     → client.rs (Dispatcher / ScopedDispatcher)
//!     → options.rs (merge defaults, per-call and plugin-wide options)
//!     → target.rs (local vs. remote, prefix, query string)
//!     → resilience::Executor (attempts, retries, logging)
//!     → Reply or CallError (error.rs)
//! ```
//!
//! # Design Decisions
//! - Transport choice depends only on the target's shape
//! - Invalid targets fail before any attempt is made
//! - Callers never see transport-library error types

pub mod client;
pub mod error;
pub mod options;
pub mod target;

pub use client::{Dispatcher, DispatcherBuilder, ScopedDispatcher};
pub use error::CallError;
pub use options::{CallOptions, JsonMode, Payload, SlowThreshold, Verb};
pub use target::CallRequest;
