//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cors_preflight_total` (counter): preflights by `outcome`
//! - `cors_actual_total` (counter): non-preflight requests by `outcome`
//!
//! `outcome` is `allowed` or a rejection label such as `origin_not_allowed`.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_preflight(outcome: &'static str) {
    counter!("cors_preflight_total", "outcome" => outcome).increment(1);
}

pub fn record_actual(outcome: &'static str) {
    counter!("cors_actual_total", "outcome" => outcome).increment(1);
}
