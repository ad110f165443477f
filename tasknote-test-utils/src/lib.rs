//! TaskNote Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Proptest generators for notes and request bodies
//! - A store that always fails, for exercising the 5xx path
//! - A store whose notes vanish before they can be written
//! - Fixtures for common scenarios

pub use tasknote_core::{
    NoteDraft, NoteId, StorageError, StorageResult, TaskNote, Timestamp, ValidationError,
};
pub use tasknote_storage::{InMemoryTaskNoteStore, TaskNoteRepository, TaskNoteStore};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// GENERATORS
// ============================================================================

/// Strategy for generating valid (non-blank) note titles.
pub fn title_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "Task [0-9]{1,5}",
        "[A-Z][a-z]{3,15} [a-z]{2,10}",
        Just("N".to_string()),
        "[a-z ]{0,40}[a-z]",
    ]
}

/// Strategy for generating optional descriptions.
pub fn description_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        2 => Just(None),
        3 => "[A-Za-z0-9 .,!?]{0,80}".prop_map(Some),
    ]
}

/// Strategy for generating validated drafts.
pub fn draft_strategy() -> impl Strategy<Value = NoteDraft> {
    (title_strategy(), description_strategy()).prop_map(|(title, description)| NoteDraft {
        title,
        description,
    })
}

/// Strategy for titles that must be rejected.
pub fn blank_title_strategy() -> impl Strategy<Value = String> {
    "[ \t\n]{0,8}"
}

/// JSON request body for a draft.
pub fn draft_body(draft: &NoteDraft) -> Value {
    json!({
        "title": draft.title,
        "description": draft.description,
    })
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A committed-looking note with a fixed timestamp.
pub fn note_fixture(id: i32, title: &str) -> TaskNote {
    TaskNote {
        id: NoteId(id),
        title: title.to_string(),
        description: None,
        created_at: Utc
            .timestamp_opt(1_700_000_000 + i64::from(id), 0)
            .single()
            .unwrap_or_else(Utc::now),
    }
}

/// A store pre-populated with the given titles, created in order.
pub async fn seeded_store(titles: &[&str]) -> StorageResult<InMemoryTaskNoteStore> {
    let store = InMemoryTaskNoteStore::new();
    let repo = store.repository();
    for title in titles {
        repo.create(NoteDraft::new(*title)).await?;
    }
    Ok(store)
}

// ============================================================================
// FAILING STORE
// ============================================================================

/// Store whose backend is permanently unreachable.
#[derive(Debug, Clone, Default)]
pub struct UnavailableStore;

#[async_trait]
impl TaskNoteStore for UnavailableStore {
    async fn open(&self) -> StorageResult<Box<dyn TaskNoteRepository>> {
        Err(StorageError::unavailable("connection refused"))
    }

    async fn ping(&self) -> StorageResult<()> {
        Err(StorageError::unavailable("connection refused"))
    }
}

// ============================================================================
// RACING DELETE STORE
// ============================================================================

/// Store where every note is found but gone by the time it is written,
/// as if another request deleted it in between.
#[derive(Debug, Clone, Default)]
pub struct RacingDeleteStore {
    commits: Arc<AtomicUsize>,
}

impl RacingDeleteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `commit` calls across all repositories.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskNoteStore for RacingDeleteStore {
    async fn open(&self) -> StorageResult<Box<dyn TaskNoteRepository>> {
        Ok(Box::new(RacingDeleteRepository {
            commits: Arc::clone(&self.commits),
        }))
    }
}

struct RacingDeleteRepository {
    commits: Arc<AtomicUsize>,
}

#[async_trait]
impl TaskNoteRepository for RacingDeleteRepository {
    async fn list_all(&self) -> StorageResult<Vec<TaskNote>> {
        Ok(Vec::new())
    }

    async fn get_by_id(&self, id: NoteId) -> StorageResult<Option<TaskNote>> {
        Ok(Some(note_fixture(id.get(), "about to vanish")))
    }

    async fn create(&self, draft: NoteDraft) -> StorageResult<TaskNote> {
        let mut note = note_fixture(1, &draft.title);
        note.apply(draft);
        Ok(note)
    }

    async fn update(&self, _note: &TaskNote) -> StorageResult<bool> {
        Ok(false)
    }

    async fn delete(&self, _note: &TaskNote) -> StorageResult<bool> {
        Ok(false)
    }

    async fn commit(&self) -> StorageResult<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
