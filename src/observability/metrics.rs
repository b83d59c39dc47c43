//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method and status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_bridge_sessions_total` (counter): websocket bridge sessions

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "gateway_requests_total",
                "Total requests handled, by method and status"
            );
            describe_histogram!(
                "gateway_request_duration_seconds",
                "Request latency in seconds"
            );
            describe_counter!(
                "gateway_bridge_sessions_total",
                "Websocket bridge sessions opened"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one terminal response.
pub fn record_request(method: &str, status: StatusCode, started: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.as_u16().to_string(),
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// Record an accepted bridge session.
pub fn record_bridge_session() {
    counter!("gateway_bridge_sessions_total").increment(1);
}
