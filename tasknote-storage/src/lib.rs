//! TaskNote Storage - Access Traits and In-Memory Implementation
//!
//! Defines the data access contract used by the request handlers.
//! The PostgreSQL implementation lives in tasknote-api next to the pool.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use tasknote_core::{NoteDraft, NoteId, StorageResult, TaskNote};

pub use memory::{InMemoryTaskNoteRepository, InMemoryTaskNoteStore};

// ============================================================================
// ACCESS TRAITS
// ============================================================================

/// Opens units of work against a note backend.
///
/// One repository is opened per request and dropped when the request ends.
#[async_trait]
pub trait TaskNoteStore: Send + Sync {
    /// Open a new unit of work.
    async fn open(&self) -> StorageResult<Box<dyn TaskNoteRepository>>;

    /// Readiness probe for the backend.
    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// The note access operations. Each call issues exactly one storage command.
///
/// Writes made through `update` stay pending until `commit`. `create` and
/// `delete` commit on their own, flushing anything already pending with them.
/// Dropping a repository discards uncommitted writes.
#[async_trait]
pub trait TaskNoteRepository: Send + Sync {
    /// All notes, newest first.
    async fn list_all(&self) -> StorageResult<Vec<TaskNote>>;

    /// The note with the given id, or `None` when absent.
    async fn get_by_id(&self, id: NoteId) -> StorageResult<Option<TaskNote>>;

    /// Insert a note; storage assigns `id` and `created_at`.
    async fn create(&self, draft: NoteDraft) -> StorageResult<TaskNote>;

    /// Stage the mutable fields of an already-fetched note.
    ///
    /// Returns whether a row was affected.
    async fn update(&self, note: &TaskNote) -> StorageResult<bool>;

    /// Remove an already-fetched note. Returns whether a row was affected.
    async fn delete(&self, note: &TaskNote) -> StorageResult<bool>;

    /// Flush pending changes.
    async fn commit(&self) -> StorageResult<()>;
}

#[async_trait]
impl<T: TaskNoteStore + ?Sized> TaskNoteStore for Arc<T> {
    async fn open(&self) -> StorageResult<Box<dyn TaskNoteRepository>> {
        (**self).open().await
    }

    async fn ping(&self) -> StorageResult<()> {
        (**self).ping().await
    }
}
