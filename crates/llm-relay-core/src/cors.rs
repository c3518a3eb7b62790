use bytes::Bytes;
use http::StatusCode;
use llm_relay_common::{AllowedOrigin, WILDCARD_ORIGIN};

use crate::headers::{Headers, header_set};
use crate::response::RelayResponse;

pub const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// `*` when any origin is allowed, otherwise the caller's origin echoed back
/// (`*` if the caller sent none).
pub fn allow_origin_value<'a>(origin: Option<&'a str>, allowed: &AllowedOrigin) -> &'a str {
    if allowed.is_wildcard() {
        return WILDCARD_ORIGIN;
    }
    origin
        .filter(|value| !value.is_empty())
        .unwrap_or(WILDCARD_ORIGIN)
}

pub fn cors_headers(origin: Option<&str>, allowed: &AllowedOrigin) -> Headers {
    let mut headers = Headers::new();
    header_set(&mut headers, ALLOW_ORIGIN, allow_origin_value(origin, allowed));
    header_set(&mut headers, ALLOW_METHODS, ALLOWED_METHODS);
    header_set(&mut headers, ALLOW_HEADERS, ALLOWED_HEADERS);
    headers
}

pub fn cors_response(
    body: impl Into<Bytes>,
    status: StatusCode,
    origin: Option<&str>,
    allowed: &AllowedOrigin,
    content_type: &str,
) -> RelayResponse {
    let mut resp = RelayResponse::new(status, body);
    resp.headers = cors_headers(origin, allowed);
    resp.with_header("Content-Type", content_type)
}
