//! PostgreSQL unit of work for task notes.
//!
//! Each repository owns one pooled connection for its lifetime. Writes open a
//! transaction lazily; `create` and `delete` commit it straight away while
//! `update` leaves it open until `commit`. A repository dropped with an open
//! transaction detaches its connection from the pool, so the server rolls the
//! transaction back when the socket closes and no half-finished session is
//! handed to the next request.

use std::time::Instant;

use async_trait::async_trait;
use deadpool_postgres::Object;
use tasknote_core::{NoteDraft, NoteId, StorageError, StorageResult, TaskNote};
use tasknote_storage::TaskNoteRepository;
use tokio::sync::Mutex;
use tokio_postgres::Row;

use crate::db::pg_storage_error;
use crate::telemetry::record_db_operation;

const LIST_SQL: &str = "SELECT id, title, description, created_at FROM task_notes \
                        ORDER BY created_at DESC, id DESC";
const GET_SQL: &str = "SELECT id, title, description, created_at FROM task_notes WHERE id = $1";
const INSERT_SQL: &str = "INSERT INTO task_notes (title, description) VALUES ($1, $2) \
                          RETURNING id, title, description, created_at";
const UPDATE_SQL: &str = "UPDATE task_notes SET title = $2, description = $3 WHERE id = $1";
const DELETE_SQL: &str = "DELETE FROM task_notes WHERE id = $1";

struct Session {
    conn: Option<Object>,
    in_transaction: bool,
}

impl Session {
    fn conn(&self) -> StorageResult<&Object> {
        self.conn
            .as_ref()
            .ok_or_else(|| StorageError::unavailable("connection already released"))
    }

    async fn begin(&mut self) -> StorageResult<()> {
        if self.in_transaction {
            return Ok(());
        }
        self.conn()?
            .batch_execute("BEGIN")
            .await
            .map_err(|e| transaction_error("begin", e))?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> StorageResult<()> {
        if !self.in_transaction {
            return Ok(());
        }
        let started = Instant::now();
        let result = self.conn()?.batch_execute("COMMIT").await;
        record_db_operation("commit", result.is_ok(), started);
        result.map_err(|e| transaction_error("commit", e))?;
        self.in_transaction = false;
        Ok(())
    }
}

fn transaction_error(stage: &str, err: tokio_postgres::Error) -> StorageError {
    match pg_storage_error(stage, err) {
        StorageError::QueryFailed { reason, .. } => StorageError::TransactionFailed { reason },
        other => other,
    }
}

fn row_to_note(row: &Row) -> StorageResult<TaskNote> {
    let decode = |e: tokio_postgres::Error| StorageError::query_failed("decode_row", e.to_string());
    Ok(TaskNote {
        id: NoteId(row.try_get("id").map_err(decode)?),
        title: row.try_get("title").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}

/// One request's worth of note access over a single connection.
pub struct PgTaskNoteRepository {
    session: Mutex<Session>,
}

impl PgTaskNoteRepository {
    pub fn new(conn: Object) -> Self {
        Self {
            session: Mutex::new(Session {
                conn: Some(conn),
                in_transaction: false,
            }),
        }
    }
}

#[async_trait]
impl TaskNoteRepository for PgTaskNoteRepository {
    async fn list_all(&self) -> StorageResult<Vec<TaskNote>> {
        let session = self.session.lock().await;
        let started = Instant::now();
        let result = session.conn()?.query(LIST_SQL, &[]).await;
        record_db_operation("list_all", result.is_ok(), started);

        let rows = result.map_err(|e| pg_storage_error("list_all", e))?;
        rows.iter().map(row_to_note).collect()
    }

    async fn get_by_id(&self, id: NoteId) -> StorageResult<Option<TaskNote>> {
        let session = self.session.lock().await;
        let started = Instant::now();
        let result = session.conn()?.query_opt(GET_SQL, &[&id.get()]).await;
        record_db_operation("get_by_id", result.is_ok(), started);

        match result.map_err(|e| pg_storage_error("get_by_id", e))? {
            Some(row) => Ok(Some(row_to_note(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, draft: NoteDraft) -> StorageResult<TaskNote> {
        let mut session = self.session.lock().await;
        session.begin().await?;

        let started = Instant::now();
        let result = session
            .conn()?
            .query_one(INSERT_SQL, &[&draft.title, &draft.description])
            .await;
        record_db_operation("create", result.is_ok(), started);

        let note = row_to_note(&result.map_err(|e| pg_storage_error("create", e))?)?;
        session.commit().await?;
        Ok(note)
    }

    async fn update(&self, note: &TaskNote) -> StorageResult<bool> {
        let mut session = self.session.lock().await;
        session.begin().await?;

        let started = Instant::now();
        let result = session
            .conn()?
            .execute(UPDATE_SQL, &[&note.id.get(), &note.title, &note.description])
            .await;
        record_db_operation("update", result.is_ok(), started);

        let affected = result.map_err(|e| pg_storage_error("update", e))?;
        Ok(affected > 0)
    }

    async fn delete(&self, note: &TaskNote) -> StorageResult<bool> {
        let mut session = self.session.lock().await;
        session.begin().await?;

        let started = Instant::now();
        let result = session.conn()?.execute(DELETE_SQL, &[&note.id.get()]).await;
        record_db_operation("delete", result.is_ok(), started);

        let affected = result.map_err(|e| pg_storage_error("delete", e))?;
        session.commit().await?;
        Ok(affected > 0)
    }

    async fn commit(&self) -> StorageResult<()> {
        self.session.lock().await.commit().await
    }
}

impl Drop for PgTaskNoteRepository {
    fn drop(&mut self) {
        let session = self.session.get_mut();
        if !session.in_transaction {
            return;
        }
        if let Some(conn) = session.conn.take() {
            tracing::debug!("Discarding connection with uncommitted note changes");
            drop(Object::take(conn));
        }
    }
}
