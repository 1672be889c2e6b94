//! Prometheus metrics for itinerary-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;
use std::time::Duration;

static METRICS: OnceLock<Metrics> = OnceLock::new();

pub struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    itinerary_requests_total: IntCounterVec,
    upstream_latency_seconds: HistogramVec,
}

impl Metrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;

        // outcome: success, missing_input, missing_credential, upstream_failure,
        // malformed_upstream_json, internal
        let itinerary_requests_total = IntCounterVec::new(
            Opts::new(
                "itinerary_requests_total",
                "Itinerary generation requests by outcome",
            ),
            &["outcome"],
        )?;

        let upstream_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "itinerary_upstream_latency_seconds",
                "Latency of the generation provider call in seconds",
            )
            .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
            &["provider"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(itinerary_requests_total.clone()))?;
        registry.register(Box::new(upstream_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            itinerary_requests_total,
            upstream_latency_seconds,
        })
    }
}

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() {
    metrics();
}

fn metrics() -> Option<&'static Metrics> {
    if let Some(metrics) = METRICS.get() {
        return Some(metrics);
    }
    match Metrics::new() {
        Ok(created) => Some(METRICS.get_or_init(|| created)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create metrics");
            None
        }
    }
}

pub fn record_http_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    if let Some(m) = metrics() {
        let status = status.to_string();
        let labels = [method, path, status.as_str()];
        m.http_requests_total.with_label_values(&labels).inc();
        m.http_request_duration_seconds
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }
}

pub fn record_itinerary_outcome(outcome: &str) {
    if let Some(m) = metrics() {
        m.itinerary_requests_total
            .with_label_values(&[outcome])
            .inc();
    }
}

pub fn record_upstream_latency(provider: &str, elapsed: Duration) {
    if let Some(m) = metrics() {
        m.upstream_latency_seconds
            .with_label_values(&[provider])
            .observe(elapsed.as_secs_f64());
    }
}

/// Render all metrics in the Prometheus text format.
pub fn get_metrics() -> Result<String, anyhow::Error> {
    let m = metrics().ok_or_else(|| anyhow::anyhow!("metrics registry not initialized"))?;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&m.registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
