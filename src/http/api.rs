//! Legacy API translation handler.
//!
//! # Data Flow
//! ```text
//! LegacyQuery
//!     → EnvironmentInit::init
//!     → translate() (400 if no `type`)
//!     → UpstreamClient::fetch_api (504 on deadline; redirects followed
//!       for every kind but `url`)
//!     → 302 on `types=url`  → JSON envelope
//!     → non-2xx             → upstream status + "API Error"
//!     → body                → parsed JSON (502 if invalid), re-serialized
//! ```

use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};

use crate::http::error::ProxyError;
use crate::http::server::AppState;
use crate::security::headers::{default_json_content_type, public_cache, sanitize_headers, JSON_CONTENT_TYPE};
use crate::translate::{translate, LegacyQuery, LegacyType, StreamUrlEnvelope};
use crate::upstream::ForwardedHeaders;

/// Translate a legacy API query, call upstream and shape the reply.
pub async fn proxy_api(
    state: &AppState,
    query: &LegacyQuery,
    request_headers: &HeaderMap,
) -> Result<Response, ProxyError> {
    state
        .init
        .init(&state.environment)
        .map_err(|e| ProxyError::Init(e.to_string()))?;

    let translation = translate(query, &state.config.defaults);
    if !translation.has_type() {
        return Err(ProxyError::MissingType);
    }

    tracing::debug!(
        kind = translation.kind.as_str(),
        query = %translation.upstream.to_query_string(),
        "Translated API request"
    );

    let forwarded = ForwardedHeaders::from_request(request_headers);
    let upstream = state
        .upstream
        .fetch_api(
            &translation.upstream,
            translation.kind.follows_redirects(),
            &forwarded,
        )
        .await?;
    let status = upstream.status();

    if translation.kind == LegacyType::Url && status == StatusCode::FOUND {
        return Ok(redirect_envelope(state, upstream.headers()));
    }

    if !status.is_success() {
        return Err(ProxyError::Upstream {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    let mut headers = sanitize_headers(Some(upstream.headers()));
    // The body is re-serialized, so upstream framing no longer applies.
    headers.remove(header::CONTENT_LENGTH);
    default_json_content_type(&mut headers);

    let bytes = upstream.bytes().await.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read upstream API body");
        ProxyError::Parse
    })?;
    let data: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
        tracing::warn!(error = %e, "Upstream API body is not JSON");
        ProxyError::Parse
    })?;

    if let Some(max_age) = translation.kind.cache_max_age(&state.config.cache) {
        headers.insert(header::CACHE_CONTROL, public_cache(max_age));
    }

    let body = serde_json::to_vec(&data).map_err(|e| ProxyError::Unknown(e.to_string()))?;
    Ok(json_response(StatusCode::OK, headers, body))
}

/// Turn an upstream 302 into `{ code: 200, message, data: { url, sourceSwitch? } }`.
fn redirect_envelope(state: &AppState, upstream_headers: &HeaderMap) -> Response {
    let header_str = |name: &str| {
        upstream_headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let envelope = StreamUrlEnvelope::success(
        header_str("location"),
        header_str("x-source-switch").filter(|v| !v.is_empty()),
    );

    tracing::debug!(url = ?envelope.data.url, "Upstream redirect converted to JSON");

    let mut headers = sanitize_headers(Some(upstream_headers));
    headers.remove(header::CONTENT_LENGTH);
    headers.insert(
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    headers.insert(
        header::CACHE_CONTROL,
        public_cache(state.config.cache.detail_max_age_secs),
    );

    let body = serde_json::to_vec(&envelope).unwrap_or_default();
    json_response(StatusCode::OK, headers, body)
}

fn json_response(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
