//! In-memory note store for testing and local development.
//!
//! Uses tokio::sync locks for safe async access. Staged updates live in the
//! repository until `commit`, so they stay invisible to other repositories.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tasknote_core::{sort_newest_first, NoteDraft, NoteId, StorageResult, TaskNote};
use tokio::sync::{Mutex, RwLock};

use crate::{TaskNoteRepository, TaskNoteStore};

#[derive(Debug, Default)]
struct NoteTable {
    /// Last identity value handed out.
    last_id: i32,
    rows: BTreeMap<NoteId, TaskNote>,
}

/// Shared in-memory note table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskNoteStore {
    table: Arc<RwLock<NoteTable>>,
}

impl InMemoryTaskNoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a concrete repository (no boxing).
    pub fn repository(&self) -> InMemoryTaskNoteRepository {
        InMemoryTaskNoteRepository {
            table: Arc::clone(&self.table),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Number of committed notes.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Committed copy of a note, bypassing any unit of work.
    pub async fn snapshot(&self, id: NoteId) -> Option<TaskNote> {
        self.table.read().await.rows.get(&id).cloned()
    }
}

#[async_trait]
impl TaskNoteStore for InMemoryTaskNoteStore {
    async fn open(&self) -> StorageResult<Box<dyn TaskNoteRepository>> {
        Ok(Box::new(self.repository()))
    }
}

/// One unit of work over an [`InMemoryTaskNoteStore`].
#[derive(Debug)]
pub struct InMemoryTaskNoteRepository {
    table: Arc<RwLock<NoteTable>>,
    pending: Mutex<Vec<TaskNote>>,
}

#[async_trait]
impl TaskNoteRepository for InMemoryTaskNoteRepository {
    async fn list_all(&self) -> StorageResult<Vec<TaskNote>> {
        let table = self.table.read().await;
        let mut notes: Vec<TaskNote> = table.rows.values().cloned().collect();
        sort_newest_first(&mut notes);
        Ok(notes)
    }

    async fn get_by_id(&self, id: NoteId) -> StorageResult<Option<TaskNote>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, draft: NoteDraft) -> StorageResult<TaskNote> {
        let note = {
            let mut table = self.table.write().await;
            table.last_id += 1;
            let note = TaskNote {
                id: NoteId(table.last_id),
                title: draft.title,
                description: draft.description,
                created_at: Utc::now(),
            };
            table.rows.insert(note.id, note.clone());
            note
        };
        self.commit().await?;
        Ok(note)
    }

    async fn update(&self, note: &TaskNote) -> StorageResult<bool> {
        if !self.table.read().await.rows.contains_key(&note.id) {
            return Ok(false);
        }

        let mut pending = self.pending.lock().await;
        pending.retain(|staged| staged.id != note.id);
        pending.push(note.clone());
        Ok(true)
    }

    async fn delete(&self, note: &TaskNote) -> StorageResult<bool> {
        let removed = self.table.write().await.rows.remove(&note.id).is_some();
        self.commit().await?;
        Ok(removed)
    }

    async fn commit(&self) -> StorageResult<()> {
        let staged: Vec<TaskNote> = self.pending.lock().await.drain(..).collect();
        if staged.is_empty() {
            return Ok(());
        }

        let mut table = self.table.write().await;
        for note in staged {
            // Rows deleted since staging are skipped, like an UPDATE matching nothing.
            if let Some(row) = table.rows.get_mut(&note.id) {
                row.title = note.title;
                row.description = note.description;
            }
        }
        Ok(())
    }
}
