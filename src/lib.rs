//! Helpers for an HTTP/HTTPS forwarding proxy.
//!
//! Four independent, synchronous transformations used beside a proxy's
//! request/response pipeline:
//! - [`select_transport`]: plaintext or TLS, from the target scheme
//! - [`fix_headers`]: point the Host header at the target
//! - [`flatten_headers`]: one string per header field
//! - [`decode_body`]: captured response body to text

pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod observability;

pub use config::schema::HelperConfig;
pub use error::{ProxyError, Result};
pub use http::{decode_body, fix_headers, flatten_headers, CapturedResponse, FieldValue, HeaderSet};
pub use net::{select_transport, Target, Transport};
