//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): lookups by outcome
//! - `router_dispatch_duration_seconds` (histogram): lookup latency by outcome
//! - `router_routes_registered` (gauge): routes in the active table
//! - `router_config_reloads_total` (counter): hot reloads by result
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are fixed strings, never request data

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one dispatch and its latency.
pub fn record_dispatch(outcome: &'static str, start: Instant) {
    metrics::counter!("router_dispatch_total", "outcome" => outcome).increment(1);
    metrics::histogram!("router_dispatch_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn set_routes_registered(count: usize) {
    metrics::gauge!("router_routes_registered").set(count as f64);
}

/// `result` is `success` or `failure`.
pub fn record_reload(result: &'static str) {
    metrics::counter!("router_config_reloads_total", "result" => result).increment(1);
}
