//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DispatchConfig (validated, immutable)
//!     → plugin-wide options handed to the Dispatcher at install time
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the dispatcher keeps its own copy
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::DispatchConfig;
pub use schema::DispatchOptions;
pub use schema::ObservabilityConfig;
pub use schema::ServerConfig;
pub use schema::TimingConfig;
