//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, service, status
//! - `gateway_request_duration_seconds` (histogram): latency by service
//! - `gateway_upstream_failures_total` (counter): transport failures by
//!   service and kind
//!
//! Recording without an installed recorder is a no-op, so tests and
//! deployments with metrics disabled pay nothing.
//!
//! Label values never come straight from the request: services outside the
//! registry collapse into `unknown` and extension methods into `other`, so
//! the number of series stays bounded by configuration.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::forward::FailureKind;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    describe_counter!("gateway_requests_total", "Total requests handled by the gateway");
    describe_histogram!(
        "gateway_request_duration_seconds",
        "Time from request receipt to response, in seconds"
    );
    describe_counter!(
        "gateway_upstream_failures_total",
        "Forwarded calls that ended in a transport failure"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Service label for requests that matched no registered service.
pub const UNKNOWN_SERVICE: &str = "unknown";

const STANDARD_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::CONNECT,
    Method::TRACE,
];

fn method_label(method: &Method) -> String {
    if STANDARD_METHODS.contains(method) {
        method.as_str().to_owned()
    } else {
        "other".to_owned()
    }
}

/// Record a finished request. `service` is the registered name, or `None`
/// when the path resolved to no service.
pub fn record_request(method: &Method, service: Option<&str>, status: u16, start: Instant) {
    let service = service.unwrap_or(UNKNOWN_SERVICE).to_string();
    counter!(
        "gateway_requests_total",
        "method" => method_label(method),
        "service" => service.clone(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "gateway_request_duration_seconds",
        "service" => service
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure(service: &str, kind: FailureKind) {
    counter!(
        "gateway_upstream_failures_total",
        "service" => service.to_string(),
        "kind" => kind.as_str()
    )
    .increment(1);
}
