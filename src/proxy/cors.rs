//! Fixed CORS header set.
//!
//! The query submitter runs from a browser origin, so every proxy response,
//! success or error, carries the same permissive headers.

use axum::http::{
    header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN},
    HeaderName, HeaderValue,
};

pub const ALLOW_ORIGIN: &str = "*";

pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// The headers attached to every proxy response.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 2] {
    [
        (
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ),
        (
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ),
    ]
}
