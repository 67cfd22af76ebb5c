//! Metrics collection and exposition.
//!
//! # Metrics
//! - `urlmapping_dispatch_total` (counter): dispatches by prefix and outcome
//!   (`converted`, `not_found`, `missing_handler`, `unmapped`)
//! - `urlmapping_delivery_total` (counter): responses by kind
//!   (`redirect`, `screen`) and status
//! - `urlmapping_delivery_errors_total` (counter): failed deliveries by error
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Unmapped requests are not labelled with their prefix to bound
//!   cardinality

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(prefix: &str, outcome: &'static str) {
    metrics::counter!(
        "urlmapping_dispatch_total",
        "prefix" => prefix.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_delivery(kind: &'static str, status: u16) {
    metrics::counter!(
        "urlmapping_delivery_total",
        "kind" => kind,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_delivery_error(code: &'static str) {
    metrics::counter!("urlmapping_delivery_errors_total", "error" => code).increment(1);
}
