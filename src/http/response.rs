//! Captured response inspection.
//!
//! # Responsibilities
//! - Hold a response captured from a backend (headers + raw body)
//! - Decode the body to text according to Content-Encoding
//!
//! # Design Decisions
//! - Only identity, gzip and deflate are understood; anything else is
//!   read as identity and logged
//! - Streams flushed without their end marker decode to whatever was
//!   received instead of failing
//! - Body text is UTF-8, invalid sequences replaced

use std::fmt;
use std::io::{self, Read};

use flate2::read::{MultiGzDecoder, ZlibDecoder};
use hyper::body::Bytes;

use crate::error::{ProxyError, Result};
use crate::http::headers::HeaderSet;
use crate::observability::metrics;

const CONTENT_ENCODING: &str = "content-encoding";

/// Content codings the decoder knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    Deflate,
}

impl ContentEncoding {
    /// Map a header value to an encoding.
    /// Returns `None` for codings outside the supported set.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "identity" => Some(ContentEncoding::Identity),
            "gzip" => Some(ContentEncoding::Gzip),
            "deflate" => Some(ContentEncoding::Deflate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Identity => "identity",
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Deflate => "deflate",
        }
    }

    /// Decompress `body` under this encoding.
    pub fn decode(&self, body: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            ContentEncoding::Identity => Ok(body.to_vec()),
            ContentEncoding::Gzip => gunzip(body),
            ContentEncoding::Deflate => inflate(body),
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A backend response as recorded by the proxy.
#[derive(Debug, Clone, Default)]
pub struct CapturedResponse {
    pub headers: HeaderSet,
    pub body: Option<Bytes>,
}

impl CapturedResponse {
    pub fn new(headers: HeaderSet, body: Option<Bytes>) -> Self {
        Self { headers, body }
    }

    /// Encoding declared by the response headers.
    ///
    /// Missing header means identity. For a repeated header the first value
    /// wins. Unknown codings fall back to identity with a warning.
    pub fn content_encoding(&self) -> ContentEncoding {
        let Some(raw) = self.headers.get(CONTENT_ENCODING).and_then(|v| v.first()) else {
            return ContentEncoding::Identity;
        };

        ContentEncoding::parse(raw).unwrap_or_else(|| {
            tracing::warn!(content_encoding = %raw, "Unrecognized content-encoding, reading body as identity");
            metrics::record_encoding_fallback();
            ContentEncoding::Identity
        })
    }
}

/// Decode the captured body to text.
///
/// Returns `Ok(None)` when there is no body to decode.
pub fn decode_body(response: &CapturedResponse) -> Result<Option<String>> {
    let body = match response.body.as_ref() {
        Some(body) if !body.is_empty() => body,
        _ => return Ok(None),
    };

    let encoding = response.content_encoding();
    let decoded = match encoding.decode(body) {
        Ok(bytes) => bytes,
        Err(source) => {
            tracing::debug!(encoding = %encoding, error = %source, "Response body decoding failed");
            metrics::record_body_decode(encoding, false);
            return Err(ProxyError::Decoding { encoding, source });
        }
    };

    metrics::record_body_decode(encoding, true);
    Ok(Some(String::from_utf8_lossy(&decoded).into_owned()))
}

fn gunzip(body: &[u8]) -> io::Result<Vec<u8>> {
    // Concatenated members decode back to back.
    let mut decoder = MultiGzDecoder::new(body);
    let mut decoded = Vec::new();
    match decoder.read_to_end(&mut decoded) {
        Ok(_) => Ok(decoded),
        // Header parsed but the stream stops early: keep what was inflated.
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && decoder.header().is_some() => {
            tracing::trace!(decoded_len = decoded.len(), "gzip body ended before its trailer");
            Ok(decoded)
        }
        Err(e) => Err(e),
    }
}

fn inflate(body: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(body);
    let mut decoded = Vec::new();
    match decoder.read_to_end(&mut decoded) {
        Ok(_) => Ok(decoded),
        // Stream cut before its final block or checksum: keep what was inflated.
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            tracing::trace!(decoded_len = decoded.len(), "zlib body ended before stream end");
            Ok(decoded)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{GzEncoder, ZlibEncoder};
    use flate2::Compression;
    use std::io::Write;

    fn response(encoding: Option<&str>, body: &[u8]) -> CapturedResponse {
        let mut headers = HeaderSet::new();
        if let Some(encoding) = encoding {
            headers.insert(CONTENT_ENCODING, encoding);
        }
        CapturedResponse::new(headers, Some(Bytes::copy_from_slice(body)))
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_missing_body() {
        let resp = CapturedResponse::new(HeaderSet::new(), None);
        assert_eq!(decode_body(&resp).unwrap(), None);

        let resp = response(Some("gzip"), b"");
        assert_eq!(decode_body(&resp).unwrap(), None);
    }

    #[test]
    fn test_identity_body() {
        assert_eq!(decode_body(&response(None, b"plain")).unwrap().as_deref(), Some("plain"));
        assert_eq!(
            decode_body(&response(Some("identity"), b"plain")).unwrap().as_deref(),
            Some("plain")
        );
    }

    #[test]
    fn test_gzip_body() {
        let resp = response(Some("gzip"), &gzip(b"hello"));
        assert_eq!(decode_body(&resp).unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_deflate_body() {
        let resp = response(Some("deflate"), &zlib(b"hello"));
        assert_eq!(decode_body(&resp).unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_encoding_value_is_normalized() {
        let resp = response(Some(" GZIP "), &gzip(b"hello"));
        assert_eq!(decode_body(&resp).unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_unknown_encoding_reads_as_identity() {
        let resp = response(Some("br"), b"not really brotli");
        assert_eq!(resp.content_encoding(), ContentEncoding::Identity);
        assert_eq!(
            decode_body(&resp).unwrap().as_deref(),
            Some("not really brotli")
        );
    }

    #[test]
    fn test_malformed_gzip_is_decoding_error() {
        let resp = response(Some("gzip"), b"definitely not gzip");
        match decode_body(&resp) {
            Err(ProxyError::Decoding { encoding, .. }) => assert_eq!(encoding, ContentEncoding::Gzip),
            other => panic!("expected decoding error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_deflate_is_decoding_error() {
        let resp = response(Some("deflate"), b"definitely not zlib");
        match decode_body(&resp) {
            Err(ProxyError::Decoding { encoding, .. }) => assert_eq!(encoding, ContentEncoding::Deflate),
            other => panic!("expected decoding error, got {:?}", other),
        }
    }

    #[test]
    fn test_gzip_without_trailer() {
        let mut compressed = gzip(b"hello world");
        compressed.truncate(compressed.len() - 8);
        let resp = response(Some("gzip"), &compressed);
        assert_eq!(decode_body(&resp).unwrap().as_deref(), Some("hello world"));
    }

    #[test]
    fn test_deflate_cut_mid_stream() {
        let text: String = (0..4000u32).map(|i| format!("{} ", i.wrapping_mul(2_654_435_761))).collect();
        let mut compressed = zlib(text.as_bytes());
        compressed.truncate(compressed.len() / 2);

        let decoded = decode_body(&response(Some("deflate"), &compressed)).unwrap().unwrap();
        assert!(!decoded.is_empty());
        assert!(text.starts_with(&decoded));
    }

    #[test]
    fn test_gzip_multiple_members() {
        let mut body = gzip(b"hello ");
        body.extend(gzip(b"world"));
        let resp = response(Some("gzip"), &body);
        assert_eq!(decode_body(&resp).unwrap().as_deref(), Some("hello world"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let resp = response(None, &[b'o', b'k', 0xff]);
        assert_eq!(decode_body(&resp).unwrap().as_deref(), Some("ok\u{fffd}"));
    }

    #[test]
    fn test_parse_encoding() {
        assert_eq!(ContentEncoding::parse("identity"), Some(ContentEncoding::Identity));
        assert_eq!(ContentEncoding::parse("Deflate"), Some(ContentEncoding::Deflate));
        assert_eq!(ContentEncoding::parse("zstd"), None);
        assert_eq!(ContentEncoding::Gzip.to_string(), "gzip");
    }
}
