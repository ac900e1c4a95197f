//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the single dispatch handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener with graceful shutdown
//! - Dispatch: preflight, method gate, media passthrough, API translation
//! - Observability (metrics, structured logs)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::{api, error::ProxyError, media};
use crate::lifecycle::{Environment, EnvironmentInit, NoopInit, ShutdownSignal};
use crate::observability::metrics;
use crate::security::headers::preflight_headers;
use crate::translate::LegacyQuery;
use crate::upstream::{UpstreamClient, UpstreamSetupError};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub upstream: UpstreamClient,
    pub init: Arc<dyn EnvironmentInit>,
    pub environment: Arc<Environment>,
}

impl AppState {
    pub fn new(
        config: ProxyConfig,
        init: Arc<dyn EnvironmentInit>,
    ) -> Result<Self, UpstreamSetupError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let environment = Arc::new(Environment::new(config.environment.clone()));
        Ok(Self {
            config: Arc::new(config),
            upstream,
            init,
            environment,
        })
    }
}

/// HTTP server for the music proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a server with the no-op initialization hook.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamSetupError> {
        Self::with_init(config, Arc::new(NoopInit))
    }

    /// Create a server with a custom initialization hook.
    pub fn with_init(
        config: ProxyConfig,
        init: Arc<dyn EnvironmentInit>,
    ) -> Result<Self, UpstreamSetupError> {
        let state = AppState::new(config, init)?;
        let config = state.config.clone();
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_base = %self.config.upstream.api_base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Single entry point: every path, every method.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (path, result) = dispatch(&state, request).await;

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!(request_id = %request_id, method = %method, kind = e.kind(), error = %e, "Request failed");
            } else {
                tracing::warn!(request_id = %request_id, method = %method, kind = e.kind(), error = %e, "Request rejected");
            }
            metrics::record_error(path, e.kind());
            e.into_response()
        }
    };

    metrics::record_request(path, response.status().as_u16(), start_time);
    response
}

/// Route one request. Returns the metrics label with the outcome.
async fn dispatch(
    state: &AppState,
    request: Request<Body>,
) -> (&'static str, Result<Response, ProxyError>) {
    // Only the head matters; the body of a GET/HEAD is ignored.
    let (parts, _) = request.into_parts();

    if parts.method == Method::OPTIONS {
        return ("preflight", Ok(preflight(state)));
    }

    if parts.method != Method::GET && parts.method != Method::HEAD {
        return ("rejected", Err(ProxyError::MethodNotAllowed));
    }

    let query = LegacyQuery::from_uri(&parts.uri);

    match query.get("target").filter(|t| !t.is_empty()) {
        Some(target) => (
            "media",
            media::proxy_media(state, target, parts.method.clone(), &parts.headers).await,
        ),
        None => ("api", api::proxy_api(state, &query, &parts.headers).await),
    }
}

/// 204 with CORS and max-age; nothing else is looked at.
fn preflight(state: &AppState) -> Response {
    (
        StatusCode::NO_CONTENT,
        preflight_headers(state.config.cache.preflight_max_age_secs),
    )
        .into_response()
}
