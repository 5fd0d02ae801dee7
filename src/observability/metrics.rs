//! Metrics collection and exposition.
//!
//! # Metrics
//! - `jobboard_requests_total` (counter): requests by method, route, status
//! - `jobboard_request_duration_seconds` (histogram): latency distribution
//! - `jobboard_active_sessions` (gauge): sessions held server-side
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - Route label is the registered pattern, never the raw path, so ids do
//!   not explode label cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Serve Prometheus metrics on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("jobboard_requests_total", &labels).increment(1);
    metrics::histogram!("jobboard_request_duration_seconds", &labels[..2])
        .record(start.elapsed().as_secs_f64());
}

pub fn record_sessions(count: usize) {
    metrics::gauge!("jobboard_active_sessions").set(count as f64);
}
