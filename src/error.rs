//! Error types for the forwarding helpers.

use hyper::StatusCode;
use thiserror::Error;

use crate::http::response::ContentEncoding;

/// Errors raised while preparing a request for forwarding or inspecting
/// its response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The target URL names a scheme no transport exists for.
    #[error("Target URL protocol {scheme}: not supported")]
    UnsupportedProtocol { scheme: String },

    /// The captured body could not be decompressed under its declared encoding.
    #[error("Failed to decode {encoding} response body: {source}")]
    Decoding {
        encoding: ContentEncoding,
        #[source]
        source: std::io::Error,
    },
}

impl ProxyError {
    /// Status to report to the original client when forwarding fails.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::UnsupportedProtocol { .. } | ProxyError::Decoding { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Result type for helper operations.
pub type Result<T> = std::result::Result<T, ProxyError>;
