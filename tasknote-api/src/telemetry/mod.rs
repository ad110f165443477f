//! TaskNote Telemetry - Observability Infrastructure
//!
//! Provides structured logging and Prometheus metrics for the API layer.
//! Everything works standalone; nothing is exported to an external collector.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{
    metrics_handler, record_db_operation, record_db_retry, TaskNoteMetrics, METRICS,
};
pub use middleware::observability_middleware;
pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
