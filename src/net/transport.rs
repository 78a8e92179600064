//! Outbound transport selection.
//!
//! # Responsibilities
//! - Reduce a target URL to the parts forwarding cares about (scheme, host)
//! - Pick plaintext or TLS transport from the target scheme
//! - Rewrite an inbound request URI for the chosen transport
//!
//! # Design Decisions
//! - A target without a scheme is forwarded in plaintext
//! - Scheme matching is case-insensitive
//! - Anything other than http/https is rejected, never guessed

use std::fmt;
use std::str::FromStr;

use hyper::http::uri::{Authority, InvalidUri, PathAndQuery, Scheme};
use hyper::Uri;
use serde::Serialize;

use crate::error::{ProxyError, Result};
use crate::observability::metrics;

/// Where a proxied request is forwarded to.
///
/// Only the scheme and the `host[:port]` of the parsed URL are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    scheme: Option<String>,
    host: Option<String>,
}

impl Target {
    /// Build a target from raw parts.
    /// A trailing `:` on the scheme is dropped and the scheme lower-cased.
    pub fn new(scheme: Option<&str>, host: Option<&str>) -> Self {
        let scheme = scheme
            .map(|s| s.trim_end_matches(':').to_ascii_lowercase())
            .filter(|s| !s.is_empty());
        let host = host.filter(|h| !h.is_empty()).map(str::to_string);
        Self { scheme, host }
    }

    /// Scheme without the trailing colon, e.g. `https`.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Host including an explicit port, e.g. `backend.internal:8443`.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }
}

impl From<&Uri> for Target {
    fn from(uri: &Uri) -> Self {
        let host = uri.host().map(|h| match uri.port_u16() {
            Some(port) => format!("{}:{}", h, port),
            None => h.to_string(),
        });
        Self::new(uri.scheme_str(), host.as_deref())
    }
}

impl From<&url::Url> for Target {
    fn from(url: &url::Url) -> Self {
        // `Url` drops ports that match the scheme default.
        let host = url.host_str().map(|h| match url.port() {
            Some(port) => format!("{}:{}", h, port),
            None => h.to_string(),
        });
        Self::new(Some(url.scheme()), host.as_deref())
    }
}

impl FromStr for Target {
    type Err = InvalidUri;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let uri: Uri = s.parse()?;
        Ok(Self::from(&uri))
    }
}

/// Network transport used for an outbound proxied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Plain TCP (`http`).
    Plain,
    /// TLS over TCP (`https`).
    Tls,
}

impl Transport {
    /// URI scheme requests on this transport carry.
    pub fn scheme(&self) -> Scheme {
        match self {
            Transport::Plain => Scheme::HTTP,
            Transport::Tls => Scheme::HTTPS,
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Transport::Plain => 80,
            Transport::Tls => 443,
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Transport::Tls)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Plain => "plain",
            Transport::Tls => "tls",
        }
    }

    /// Rewrite `original` so it addresses `authority` over this transport.
    ///
    /// Path and query are kept. If the authority is invalid the original
    /// URI is returned unchanged.
    pub fn outbound_uri(&self, original: &Uri, authority: &str) -> Uri {
        let authority = match Authority::from_str(authority) {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(authority = %authority, error = %e, "Invalid outbound authority, keeping original URI");
                return original.clone();
            }
        };

        let mut parts = original.clone().into_parts();
        parts.scheme = Some(self.scheme());
        parts.authority = Some(authority);
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }

        Uri::from_parts(parts).unwrap_or_else(|e| {
            tracing::warn!(uri = %original, error = %e, "Failed to rewrite outbound URI");
            original.clone()
        })
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the transport for requests forwarded to `target`.
pub fn select_transport(target: &Target) -> Result<Transport> {
    let transport = match target.scheme() {
        None => Transport::Plain,
        Some(scheme) if scheme.eq_ignore_ascii_case("https") => Transport::Tls,
        Some(scheme) if scheme.eq_ignore_ascii_case("http") => Transport::Plain,
        Some(scheme) => {
            tracing::debug!(scheme = %scheme, "Rejecting target with unsupported scheme");
            metrics::record_transport_rejected(scheme);
            return Err(ProxyError::UnsupportedProtocol {
                scheme: scheme.to_string(),
            });
        }
    };

    metrics::record_transport_selected(transport);
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_transport_by_scheme() {
        let https: Target = "https://example.com".parse().unwrap();
        assert_eq!(select_transport(&https).unwrap(), Transport::Tls);

        let http: Target = "http://example.com".parse().unwrap();
        assert_eq!(select_transport(&http).unwrap(), Transport::Plain);
    }

    #[test]
    fn test_missing_scheme_defaults_to_plain() {
        let target = Target::new(None, Some("example.com"));
        assert_eq!(select_transport(&target).unwrap(), Transport::Plain);

        let relative: Target = "/only/a/path".parse().unwrap();
        assert_eq!(relative.scheme(), None);
        assert_eq!(select_transport(&relative).unwrap(), Transport::Plain);
    }

    #[test]
    fn test_unsupported_scheme() {
        let target: Target = "ftp://files.example.com/pub".parse().unwrap();
        match select_transport(&target) {
            Err(ProxyError::UnsupportedProtocol { scheme }) => assert_eq!(scheme, "ftp"),
            other => panic!("expected UnsupportedProtocol, got {:?}", other),
        }
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let target = Target::new(Some("HTTPS:"), Some("example.com"));
        assert_eq!(target.scheme(), Some("https"));
        assert_eq!(select_transport(&target).unwrap(), Transport::Tls);
    }

    #[test]
    fn test_target_host_keeps_port() {
        let target: Target = "http://backend.internal:8080/api".parse().unwrap();
        assert_eq!(target.host(), Some("backend.internal:8080"));

        let target: Target = "https://backend.internal/api".parse().unwrap();
        assert_eq!(target.host(), Some("backend.internal"));
    }

    #[test]
    fn test_target_from_url() {
        let url = url::Url::parse("https://api.example.com:8443/v1").unwrap();
        let target = Target::from(&url);
        assert_eq!(target.scheme(), Some("https"));
        assert_eq!(target.host(), Some("api.example.com:8443"));
    }

    #[test]
    fn test_transport_properties() {
        assert_eq!(Transport::Plain.default_port(), 80);
        assert_eq!(Transport::Tls.default_port(), 443);
        assert!(Transport::Tls.is_secure());
        assert!(!Transport::Plain.is_secure());
        assert_eq!(Transport::Tls.scheme(), Scheme::HTTPS);
        assert_eq!(Transport::Plain.to_string(), "plain");
    }

    #[test]
    fn test_outbound_uri_rewrite() {
        let original: Uri = "/search?q=rust".parse().unwrap();
        let uri = Transport::Tls.outbound_uri(&original, "backend.internal:8443");
        assert_eq!(uri.to_string(), "https://backend.internal:8443/search?q=rust");

        let uri = Transport::Plain.outbound_uri(&original, "not a host");
        assert_eq!(uri, original);
    }
}
