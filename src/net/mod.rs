//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Target URL (hyper::Uri / url::Url / string)
//!     → transport.rs (reduce to scheme + host, pick plain or TLS)
//!     → Transport handed to the proxy's outbound client
//! ```
//!
//! # Design Decisions
//! - Selection never opens connections; it only names the transport
//! - Unsupported schemes fail the forwarding attempt up front

pub mod transport;

pub use transport::{select_transport, Target, Transport};
