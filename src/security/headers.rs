//! Response header sanitization and CORS.
//!
//! # Responsibilities
//! - Copy only allow-listed upstream headers to the client
//! - Default Cache-Control to `no-store`
//! - Attach permissive CORS headers to every response
//!
//! # Design Decisions
//! - Allow-list, not deny-list: cookies, server identity and tracing IDs
//!   from upstream never reach the client
//! - Pure functions over `HeaderMap`; no I/O

use axum::http::{
    header::{self, HeaderName},
    HeaderMap, HeaderValue,
};

/// Upstream headers that may be forwarded.
pub const SAFE_RESPONSE_HEADERS: [HeaderName; 8] = [
    header::CONTENT_TYPE,
    header::CACHE_CONTROL,
    header::ACCEPT_RANGES,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ETAG,
    header::LAST_MODIFIED,
    header::EXPIRES,
];

pub const ALLOWED_METHODS: &str = "GET,HEAD,OPTIONS";

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Build the client-facing header set from an optional upstream header set.
pub fn sanitize_headers(upstream: Option<&HeaderMap>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(upstream) = upstream {
        for (name, value) in upstream.iter() {
            // HeaderName is always lower-case.
            if SAFE_RESPONSE_HEADERS.contains(name) {
                headers.append(name.clone(), value.clone());
            }
        }
    }

    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    apply_cors(&mut headers);
    headers
}

/// Set the three CORS headers, replacing any existing values.
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
}

/// Headers for a preflight (OPTIONS) response.
pub fn preflight_headers(max_age_secs: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    apply_cors(&mut headers);
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age_secs));
    headers
}

/// `public, max-age=<secs>`.
pub fn public_cache(max_age_secs: u64) -> HeaderValue {
    // Digits and ASCII only, always a valid header value.
    HeaderValue::from_str(&format!("public, max-age={max_age_secs}"))
        .unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

/// Set Content-Type to JSON unless one is already present.
pub fn default_json_content_type(headers: &mut HeaderMap) {
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        );
    }
}
