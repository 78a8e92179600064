//! HTTP protocol helpers.
//!
//! # Data Flow
//! ```text
//! Inbound request headers
//!     → headers.rs (fix Host for the target, flatten repeated fields)
//!     → forwarded by the proxy
//!
//! Captured backend response
//!     → response.rs (decode body per Content-Encoding)
//!     → text for inspection / recording
//! ```

pub mod headers;
pub mod response;

pub use headers::{fix_headers, flatten_headers, FieldValue, FlatHeaders, HeaderSet};
pub use response::{decode_body, CapturedResponse, ContentEncoding};
