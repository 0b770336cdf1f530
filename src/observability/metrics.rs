//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): forwarded requests by method, status
//! - `gateway_request_duration_seconds` (histogram): forwarding latency
//! - `gateway_redirect_decisions_total` (counter): home path outcomes
//! - `gateway_identity_failures_total` (counter): identity errors by kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Outcome is one of `username`, `role`, `default`, `login`, `none`, `loop`.
pub fn record_redirect_decision(outcome: &'static str) {
    ::metrics::counter!("gateway_redirect_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_identity_failure(kind: &'static str) {
    ::metrics::counter!("gateway_identity_failures_total", "kind" => kind).increment(1);
}
