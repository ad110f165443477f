//! Prometheus Metrics Definitions
//!
//! Defines the TaskNote metrics with their labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use std::time::Instant;

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Database operation latency buckets (seconds)
const DB_LATENCY_BUCKETS: &[f64] =
    &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0];

/// Global metrics instance - initialized on first use
pub static METRICS: Lazy<ApiResult<TaskNoteMetrics>> = Lazy::new(TaskNoteMetrics::new);

/// Container for all TaskNote metrics.
#[derive(Clone)]
pub struct TaskNoteMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Database operation counter - labels: operation, status
    pub db_operations_total: CounterVec,

    /// Database operation duration histogram - labels: operation
    pub db_operation_duration_seconds: HistogramVec,

    /// Connection-level retries - labels: operation
    pub db_connection_retries_total: CounterVec,
}

fn registration_error(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

impl TaskNoteMetrics {
    /// Create and register all metrics with the default Prometheus registry.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "tasknote_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_error("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "tasknote_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("http_request_duration_seconds", e))?,

            db_operations_total: register_counter_vec!(
                "tasknote_db_operations_total",
                "Total number of database operations",
                &["operation", "status"]
            )
            .map_err(|e| registration_error("db_operations_total", e))?,

            db_operation_duration_seconds: register_histogram_vec!(
                "tasknote_db_operation_duration_seconds",
                "Database operation duration in seconds",
                &["operation"],
                DB_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("db_operation_duration_seconds", e))?,

            db_connection_retries_total: register_counter_vec!(
                "tasknote_db_connection_retries_total",
                "Total retries after transient database failures",
                &["operation"]
            )
            .map_err(|e| registration_error("db_connection_retries_total", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a database operation.
    pub fn record_db_operation(&self, operation: &str, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.db_operations_total
            .with_label_values(&[operation, status])
            .inc();
        self.db_operation_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn record_retry(&self, operation: &str) {
        self.db_connection_retries_total
            .with_label_values(&[operation])
            .inc();
    }
}

/// Record a database operation on the global metrics, if they initialized.
pub fn record_db_operation(operation: &str, success: bool, started: Instant) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_db_operation(operation, success, started.elapsed().as_secs_f64());
    }
}

/// Count one retry of `operation` on the global metrics.
pub fn record_db_retry(operation: &str) {
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_retry(operation);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
))]
pub async fn metrics_handler() -> impl IntoResponse {
    if let Err(e) = METRICS.as_ref() {
        tracing::warn!(error = %e, "Metrics registry unavailable");
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
