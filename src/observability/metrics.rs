//! Metrics collection.
//!
//! # Metrics
//! - `proxy_transport_selected_total` (counter): targets resolved, by transport
//! - `proxy_transport_rejected_total` (counter): targets rejected, by scheme
//! - `proxy_body_decode_total` (counter): body decodes, by encoding and outcome
//! - `proxy_body_encoding_fallback_total` (counter): unknown content-encodings read as identity

use metrics::counter;

use crate::http::response::ContentEncoding;
use crate::net::transport::Transport;

pub fn record_transport_selected(transport: Transport) {
    counter!("proxy_transport_selected_total", "transport" => transport.as_str()).increment(1);
}

pub fn record_transport_rejected(scheme: &str) {
    counter!("proxy_transport_rejected_total", "scheme" => scheme.to_string()).increment(1);
}

pub fn record_body_decode(encoding: ContentEncoding, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!(
        "proxy_body_decode_total",
        "encoding" => encoding.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_encoding_fallback() {
    counter!("proxy_body_encoding_fallback_total").increment(1);
}
