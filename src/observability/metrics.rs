//! Metrics collection and exposition.
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by route, method, status
//! - `http_request_duration_seconds` (histogram): latency by route, method
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed with [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::observability::trace::TraceRecord;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one finished request.
pub fn record_request(record: &TraceRecord) {
    metrics::counter!(
        "http_requests_total",
        "route" => record.route_name.clone(),
        "method" => record.method.to_string(),
        "status" => record.status.as_u16().to_string()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "route" => record.route_name.clone(),
        "method" => record.method.to_string()
    )
    .record(record.elapsed.as_secs_f64());
}
