//! Fixed headers stamped on every response.
//!
//! Resolved markup is echoed back verbatim, so it is never sniffed, framed
//! or stored by intermediaries.

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

/// `(name, value)` pairs applied by [`response_headers`].
pub(crate) const RESPONSE_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("cache-control", "no-store"),
];

/// One layer per entry of [`RESPONSE_HEADERS`], overriding handler values.
pub(crate) fn response_headers() -> [SetResponseHeaderLayer<HeaderValue>; 3] {
    RESPONSE_HEADERS.map(|(name, value)| {
        SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        )
    })
}
