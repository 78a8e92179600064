//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::io::Write;

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use hyper::body::Bytes;

use proxy_helpers::{CapturedResponse, HeaderSet};

/// Complete gzip member.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Complete zlib stream, as sent for `Content-Encoding: deflate`.
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Gzip data sync-flushed but never finished: no final block, no trailer.
pub fn gzip_sync_flushed(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.flush().unwrap();
    encoder.get_ref().clone()
}

/// Zlib data sync-flushed but never finished: no final block, no checksum.
pub fn zlib_sync_flushed(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.flush().unwrap();
    encoder.get_ref().clone()
}

/// Build a header set from `(name, value)` pairs, appending repeats.
pub fn headers(pairs: &[(&str, &str)]) -> HeaderSet {
    let mut set = HeaderSet::new();
    for (name, value) in pairs {
        set.append(*name, *value);
    }
    set
}

/// Captured response with an optional content-encoding header.
pub fn captured(encoding: Option<&str>, body: Vec<u8>) -> CapturedResponse {
    let mut set = HeaderSet::new();
    if let Some(encoding) = encoding {
        set.insert("content-encoding", encoding);
    }
    CapturedResponse::new(set, Some(Bytes::from(body)))
}

/// Text that compresses poorly, so a cut lands in the middle of a block.
pub fn varied_text(words: u32) -> String {
    (0..words)
        .map(|i| format!("{:x} ", i.wrapping_mul(2_654_435_761) ^ 0x5bd1_e995))
        .collect()
}
