//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Resolved call:
//!     → executor.rs (one timed attempt via the chosen transport)
//!     → On failure: retries.rs (check if retryable, retry immediately)
//!     → timing.rs (write elapsed ms into the inbound request's timing bag)
//! ```
//!
//! # Design Decisions
//! - Every remote attempt has a deadline, enforced by the remote transport
//! - Retries only for transport failures and 5xx
//! - Slow-call warnings and verbose entries never both fire for one attempt

pub mod executor;
pub mod retries;
pub mod timing;

pub use executor::Executor;
pub use retries::RetryPolicy;
pub use timing::TimingBag;
