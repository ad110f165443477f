//! Health Probes
//!
//! - /health/ping - plain-text pong, touches nothing
//! - /health/live - the process is serving requests
//! - /health/ready - the note store answers a round-trip

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tasknote_storage::TaskNoteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Outcome of a liveness or readiness probe.
///
/// The storage fields are only present on readiness. A failed storage check
/// reports a fixed message; the cause goes to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub status: HealthStatus,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeReport {
    fn alive(uptime_seconds: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            uptime_seconds,
            storage_latency_ms: None,
            error: None,
        }
    }

    fn storage_down(uptime_seconds: u64) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            uptime_seconds,
            storage_latency_ms: None,
            error: Some("note storage is unreachable".to_string()),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ProbeReport {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

#[derive(Clone)]
pub struct HealthState {
    store: Arc<dyn TaskNoteStore>,
    started: Instant,
}

impl HealthState {
    pub fn new(store: Arc<dyn TaskNoteStore>) -> Self {
        Self {
            store,
            started: Instant::now(),
        }
    }

    fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Ping the store and time the round-trip.
    pub async fn probe_storage(&self) -> ProbeReport {
        let started = Instant::now();
        match self.store.ping().await {
            Ok(()) => ProbeReport {
                storage_latency_ms: Some(started.elapsed().as_millis() as u64),
                ..ProbeReport::alive(self.uptime_seconds())
            },
            Err(e) => {
                tracing::warn!(error = %e, "Readiness check failed");
                ProbeReport::storage_down(self.uptime_seconds())
            }
        }
    }
}

/// GET /health/ping
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
))]
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is alive", body = ProbeReport),
    ),
))]
pub async fn liveness(State(state): State<Arc<HealthState>>) -> ProbeReport {
    ProbeReport::alive(state.uptime_seconds())
}

/// GET /health/ready
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Note storage reachable", body = ProbeReport),
        (status = 503, description = "Note storage unreachable", body = ProbeReport),
    ),
))]
pub async fn readiness(State(state): State<Arc<HealthState>>) -> ProbeReport {
    state.probe_storage().await
}

/// Health router, nested at `/health`.
pub fn create_router(store: Arc<dyn TaskNoteStore>) -> Router {
    let state = Arc::new(HealthState::new(store));

    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasknote_storage::InMemoryTaskNoteStore;
    use tasknote_test_utils::UnavailableStore;

    #[tokio::test]
    async fn test_reachable_store_is_ready_with_latency() {
        let state = HealthState::new(Arc::new(InMemoryTaskNoteStore::new()));
        let report = state.probe_storage().await;

        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.status_code(), StatusCode::OK);
        assert!(report.storage_latency_ms.is_some());
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_store_hides_cause() {
        let state = HealthState::new(Arc::new(UnavailableStore));
        let report = state.probe_storage().await;

        assert_eq!(report.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(report.storage_latency_ms.is_none());
        let message = report.error.unwrap_or_default();
        assert!(!message.contains("connection refused"));
    }

    #[test]
    fn test_liveness_omits_storage_fields() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(ProbeReport::alive(12))?;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["uptimeSeconds"], 12);
        assert!(json.get("storageLatencyMs").is_none());
        Ok(())
    }
}
