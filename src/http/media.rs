//! Media passthrough for `?target=<url>`.
//!
//! # Responsibilities
//! - Decode and scheme-check the target URL
//! - Fetch it with the CDN Referer, relaying Range for seeking
//! - Stream the body back with sanitized headers
//!
//! # Design Decisions
//! - Only http and https targets; `file:`, `javascript:` and friends are 400
//! - Upstream status (200, 206, ...) is preserved as-is
//! - Body is streamed, never buffered

use axum::{
    body::Body,
    http::{header, HeaderMap, Method},
    response::Response,
};
use url::Url;

use crate::http::error::ProxyError;
use crate::http::server::AppState;
use crate::security::headers::{public_cache, sanitize_headers};
use crate::upstream::ForwardedHeaders;

/// Decode the raw `target` value and accept only http(s) URLs.
///
/// The value has already been form-decoded once; clients commonly
/// double-encode it, so it is percent-decoded again before parsing.
pub fn parse_target(raw: &str) -> Result<Url, ProxyError> {
    let decoded = urlencoding::decode(raw).map_err(|_| ProxyError::InvalidProtocol)?;
    let url = Url::parse(&decoded).map_err(|_| ProxyError::InvalidProtocol)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ProxyError::InvalidProtocol),
    }
}

/// Proxy a media target.
pub async fn proxy_media(
    state: &AppState,
    target: &str,
    method: Method,
    request_headers: &HeaderMap,
) -> Result<Response, ProxyError> {
    let url = parse_target(target)?;
    let forwarded = ForwardedHeaders::from_request(request_headers);

    tracing::debug!(
        url = %url,
        method = %method,
        range = ?forwarded.range,
        "Fetching media"
    );

    let upstream = state
        .upstream
        .fetch_media(method, url, &forwarded)
        .await
        .map_err(|e| ProxyError::Media(e.to_string()))?;

    let status = upstream.status();
    let forwarded_cache = upstream.headers().contains_key(header::CACHE_CONTROL);
    let mut headers = sanitize_headers(Some(upstream.headers()));
    if !forwarded_cache {
        headers.insert(
            header::CACHE_CONTROL,
            public_cache(state.config.cache.media_max_age_secs),
        );
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
