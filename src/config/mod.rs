//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → HelperConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; a missing file section means defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ForwardingConfig, HelperConfig, LogFormat, ObservabilityConfig};
