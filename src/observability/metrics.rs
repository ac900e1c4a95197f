//! Metrics collection and exposition.
//!
//! # Metrics
//! - `music_proxy_requests_total` (counter): requests by path, status
//! - `music_proxy_request_duration_seconds` (histogram): latency by path
//! - `music_proxy_errors_total` (counter): error responses by path and
//!   kind, client rejections included
//!
//! # Design Decisions
//! - `path` is one of `preflight`, `rejected`, `media`, `api`
//! - Recording without an installed exporter is a no-op

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(path: &'static str, status: u16, start: Instant) {
    counter!(
        "music_proxy_requests_total",
        "path" => path,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("music_proxy_request_duration_seconds", "path" => path)
        .record(start.elapsed().as_secs_f64());
}

/// Record a handled error by kind.
pub fn record_error(path: &'static str, kind: &'static str) {
    counter!(
        "music_proxy_errors_total",
        "path" => path,
        "kind" => kind
    )
    .increment(1);
}
