//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Helpers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → stdout/stderr (pretty or JSON)
//!     → whatever metrics recorder the embedding proxy installs
//! ```
//!
//! # Design Decisions
//! - Helpers never install global state themselves; the binary does
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
