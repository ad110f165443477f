//! OpenAPI Specification for the TaskNote API
//!
//! Generated by utoipa from the handler annotations and schema derives.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{health, tasknote};
use crate::telemetry::metrics;
use crate::types::TaskNoteRequest;
use tasknote_core::{NoteId, TaskNote};

/// OpenAPI document for the TaskNote API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TaskNote API",
        version = "0.1.0",
        description = "Create, read, update and delete short task notes",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "TaskNotes", description = "Task note CRUD"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        tasknote::list_task_notes,
        tasknote::get_task_note,
        tasknote::create_task_note,
        tasknote::update_task_note,
        tasknote::delete_task_note,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(
        schemas(
            TaskNote,
            NoteId,
            TaskNoteRequest,
            ApiError,
            ErrorCode,
            health::ProbeReport,
            health::HealthStatus,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
