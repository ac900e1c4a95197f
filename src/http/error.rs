//! Proxy error taxonomy and its HTTP rendering.
//!
//! Every failure a handler can hit is a [`ProxyError`]; nothing escapes to
//! the server as a fault. All error responses carry CORS headers so browser
//! callers can read the body.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::security::headers::{sanitize_headers, JSON_CONTENT_TYPE};

/// Errors surfaced to the caller.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Method other than GET, HEAD or OPTIONS.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Media target is unparsable or not http(s).
    #[error("Invalid protocol")]
    InvalidProtocol,

    /// Translated query has no `type`; upstream was not contacted.
    #[error("Missing type parameter")]
    MissingType,

    /// Upstream answered outside the 2xx range.
    #[error("API Error: {} {reason}", .status.as_u16())]
    Upstream { status: StatusCode, reason: String },

    /// Upstream body was not valid JSON.
    #[error("Failed to parse API response")]
    Parse,

    /// API call exceeded its deadline.
    #[error("Request timeout")]
    Timeout,

    /// Transport failure reaching the API.
    #[error("Network error")]
    Network,

    /// Any failure while fetching a media target.
    #[error("{0}")]
    Media(String),

    /// The environment initialization hook failed.
    #[error("{0}")]
    Init(String),

    #[error("{0}")]
    Unknown(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidProtocol | Self::MissingType => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => *status,
            Self::Parse | Self::Network | Self::Media(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Init(_) | Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed | Self::InvalidProtocol | Self::MissingType => "client",
            Self::Upstream { .. } => "upstream",
            Self::Parse => "parse",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Media(_) => "media",
            Self::Init(_) | Self::Unknown(_) => "unknown",
        }
    }

    /// Plain-text body instead of the JSON envelope.
    fn is_plain_text(&self) -> bool {
        matches!(self, Self::MethodNotAllowed | Self::InvalidProtocol)
    }

    /// Failures caught at the API handler boundary are stamped with the time.
    fn is_timestamped(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Network | Self::Init(_) | Self::Unknown(_)
        )
    }

    /// Classify a transport error from the upstream API client.
    pub fn from_api_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Self::Network
        } else {
            Self::Unknown(err.to_string())
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut headers = sanitize_headers(None);

        let body = if self.is_plain_text() {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            self.to_string().into_bytes()
        } else {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            );
            let body = ErrorBody {
                error: self.to_string(),
                timestamp: self
                    .is_timestamped()
                    .then(|| chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            };
            serde_json::to_vec(&body).unwrap_or_default()
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
