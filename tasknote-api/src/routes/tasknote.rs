//! TaskNote REST API Routes
//!
//! CRUD handlers for task notes. Every request opens one unit of work on the
//! store and drops it when the handler returns.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tasknote_core::TaskNote;
use tasknote_storage::TaskNoteStore;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{NoteIdPath, ValidatedJson},
    types::TaskNoteRequest,
};

/// Collection path; single notes live at `{TASKNOTE_BASE_PATH}/{id}`.
pub const TASKNOTE_BASE_PATH: &str = "/api/tasknote";

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for note routes.
#[derive(Clone)]
pub struct TaskNoteState {
    pub store: Arc<dyn TaskNoteStore>,
}

impl TaskNoteState {
    pub fn new(store: Arc<dyn TaskNoteStore>) -> Self {
        Self { store }
    }
}

/// Location of a single note.
pub fn note_location(note: &TaskNote) -> String {
    format!("{}/{}", TASKNOTE_BASE_PATH, note.id)
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/tasknote - List all notes, newest first
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/tasknote",
    tag = "TaskNotes",
    responses(
        (status = 200, description = "All notes, newest first", body = Vec<TaskNote>),
        (status = 500, description = "Storage failure", body = ApiError),
        (status = 503, description = "Storage unavailable", body = ApiError),
    ),
))]
pub async fn list_task_notes(
    State(state): State<Arc<TaskNoteState>>,
) -> ApiResult<Json<Vec<TaskNote>>> {
    let repo = state.store.open().await?;
    let notes = repo.list_all().await?;
    Ok(Json(notes))
}

/// GET /api/tasknote/{id} - Get a note by id
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/tasknote/{id}",
    tag = "TaskNotes",
    params(
        ("id" = i32, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note details", body = TaskNote),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "Note not found"),
    ),
))]
pub async fn get_task_note(
    State(state): State<Arc<TaskNoteState>>,
    NoteIdPath(id): NoteIdPath,
) -> ApiResult<Json<TaskNote>> {
    let repo = state.store.open().await?;
    let note = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::note_not_found(id))?;
    Ok(Json(note))
}

/// POST /api/tasknote - Create a new note
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/tasknote",
    tag = "TaskNotes",
    request_body = TaskNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = TaskNote,
            headers(("Location" = String, description = "URL of the new note"))),
        (status = 400, description = "Invalid request", body = ApiError),
    ),
))]
pub async fn create_task_note(
    State(state): State<Arc<TaskNoteState>>,
    ValidatedJson(req): ValidatedJson<TaskNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let draft = req.into_draft()?;

    let repo = state.store.open().await?;
    let note = repo.create(draft).await?;

    tracing::info!(note_id = %note.id, "Task note created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, note_location(&note))],
        Json(note),
    ))
}

/// PUT /api/tasknote/{id} - Replace a note's title and description
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/api/tasknote/{id}",
    tag = "TaskNotes",
    params(
        ("id" = i32, Path, description = "Note ID")
    ),
    request_body = TaskNoteRequest,
    responses(
        (status = 204, description = "Note updated"),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Note not found"),
    ),
))]
pub async fn update_task_note(
    State(state): State<Arc<TaskNoteState>>,
    NoteIdPath(id): NoteIdPath,
    ValidatedJson(req): ValidatedJson<TaskNoteRequest>,
) -> ApiResult<StatusCode> {
    // Validation comes first: an invalid body is a 400 even for a missing id.
    let draft = req.into_draft()?;

    let repo = state.store.open().await?;
    let mut note = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::note_not_found(id))?;

    note.apply(draft);
    if !repo.update(&note).await? {
        // Deleted between the fetch and the write.
        return Err(ApiError::note_not_found(id));
    }
    repo.commit().await?;

    tracing::info!(note_id = %id, "Task note updated");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/tasknote/{id} - Delete a note
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/tasknote/{id}",
    tag = "TaskNotes",
    params(
        ("id" = i32, Path, description = "Note ID")
    ),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 400, description = "Malformed id", body = ApiError),
        (status = 404, description = "Note not found"),
    ),
))]
pub async fn delete_task_note(
    State(state): State<Arc<TaskNoteState>>,
    NoteIdPath(id): NoteIdPath,
) -> ApiResult<StatusCode> {
    let repo = state.store.open().await?;
    let note = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::note_not_found(id))?;

    if !repo.delete(&note).await? {
        return Err(ApiError::note_not_found(id));
    }

    tracing::info!(note_id = %id, "Task note deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the note router, to be nested at [`TASKNOTE_BASE_PATH`].
pub fn create_router(store: Arc<dyn TaskNoteStore>) -> Router {
    let state = Arc::new(TaskNoteState::new(store));

    Router::new()
        .route("/", get(list_task_notes).post(create_task_note))
        .route(
            "/:id",
            get(get_task_note)
                .put(update_task_note)
                .delete(delete_task_note),
        )
        .with_state(state)
}
