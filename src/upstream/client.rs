//! HTTP clients for the upstream API and media targets.
//!
//! # Responsibilities
//! - Issue the bounded-time API call against the fixed base URL
//! - Issue unbounded media fetches with the CDN's required headers
//!
//! # Design Decisions
//! - The API has a redirect-following client and a non-following one; a
//!   302 on a stream-URL lookup is the answer, so that lookup uses the
//!   latter. Media fetches always follow
//! - The API deadline is a `tokio::time::timeout` around the send; dropping
//!   the future on either path cancels the timer
//! - Media fetches have only a connect timeout; streams may run long

use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue, Method};
use reqwest::{redirect, Client, Response};
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::error::ProxyError;
use crate::translate::UpstreamQuery;

/// Error building the upstream clients at startup.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamSetupError {
    #[error("invalid upstream base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("invalid referer header value: {0}")]
    Referer(#[from] header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Caller headers that are relayed upstream.
#[derive(Debug, Clone, Default)]
pub struct ForwardedHeaders {
    pub user_agent: Option<HeaderValue>,
    pub range: Option<HeaderValue>,
}

impl ForwardedHeaders {
    pub fn from_request(headers: &HeaderMap) -> Self {
        Self {
            user_agent: headers.get(header::USER_AGENT).cloned(),
            range: headers.get(header::RANGE).cloned(),
        }
    }
}

/// Shared, cheaply cloneable upstream access.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    api: Client,
    api_no_redirect: Client,
    media: Client,
    api_base: Url,
    referer: HeaderValue,
    default_user_agent: HeaderValue,
    api_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamSetupError> {
        let api_base =
            Url::parse(&config.api_base_url).map_err(|source| UpstreamSetupError::BaseUrl {
                url: config.api_base_url.clone(),
                source,
            })?;
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);

        let api = Client::builder().connect_timeout(connect_timeout).build()?;
        let api_no_redirect = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(connect_timeout)
            .build()?;
        let media = Client::builder().connect_timeout(connect_timeout).build()?;

        Ok(Self {
            api,
            api_no_redirect,
            media,
            api_base,
            referer: HeaderValue::from_str(&config.referer)?,
            default_user_agent: HeaderValue::from_str(&config.default_user_agent)?,
            api_timeout: Duration::from_secs(config.api_timeout_secs),
        })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub fn api_timeout(&self) -> Duration {
        self.api_timeout
    }

    fn user_agent(&self, forwarded: &ForwardedHeaders) -> HeaderValue {
        forwarded
            .user_agent
            .clone()
            .unwrap_or_else(|| self.default_user_agent.clone())
    }

    /// GET the API with `query`, bounded by the configured deadline.
    ///
    /// With `follow_redirects` unset a 3xx is returned to the caller as-is.
    /// Only the response head is bounded; the caller reads the body.
    pub async fn fetch_api(
        &self,
        query: &UpstreamQuery,
        follow_redirects: bool,
        forwarded: &ForwardedHeaders,
    ) -> Result<Response, ProxyError> {
        let url = query.apply_to(&self.api_base);
        tracing::debug!(url = %url, follow_redirects, "Calling upstream API");

        let client = if follow_redirects {
            &self.api
        } else {
            &self.api_no_redirect
        };
        let request = client
            .get(url)
            .header(header::USER_AGENT, self.user_agent(forwarded))
            .header(header::ACCEPT, "application/json")
            .send();

        match tokio::time::timeout(self.api_timeout, request).await {
            Ok(result) => result.map_err(ProxyError::from_api_transport),
            Err(_) => {
                tracing::warn!(timeout = ?self.api_timeout, "Upstream API call timed out");
                Err(ProxyError::Timeout)
            }
        }
    }

    /// Fetch a media target with the caller's method and Range header.
    pub async fn fetch_media(
        &self,
        method: Method,
        target: Url,
        forwarded: &ForwardedHeaders,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self
            .media
            .request(method, target)
            .header(header::USER_AGENT, self.user_agent(forwarded))
            .header(header::REFERER, self.referer.clone());

        if let Some(range) = &forwarded.range {
            request = request.header(header::RANGE, range.clone());
        }

        request.send().await
    }
}
