//! TaskNote Core - Entity Types
//!
//! Pure data structures shared by the storage and API crates.
//! No IO lives here.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::{StorageError, StorageResult, ValidationError};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Storage-generated note identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct NoteId(pub i32);

impl NoteId {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for NoteId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

// ============================================================================
// ENTITIES
// ============================================================================

/// A persisted task note.
///
/// `id` and `created_at` are assigned by storage on insert and never change
/// afterwards. Only `title` and `description` are mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TaskNote {
    pub id: NoteId,
    pub title: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl TaskNote {
    /// Overwrite the mutable fields in place.
    pub fn apply(&mut self, draft: NoteDraft) {
        self.title = draft.title;
        self.description = draft.description;
    }

    /// Listing order: newest first, ties broken by the higher id.
    pub fn newest_first(a: &TaskNote, b: &TaskNote) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Sort notes into listing order.
pub fn sort_newest_first(notes: &mut [TaskNote]) {
    notes.sort_by(TaskNote::newest_first);
}

/// The caller-supplied fields of a note, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub description: Option<String>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build a draft from raw input, rejecting a missing or blank title.
    pub fn parse(
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Self, ValidationError> {
        match title {
            None => Err(ValidationError::RequiredFieldMissing {
                field: "title".to_string(),
            }),
            Some(t) if t.trim().is_empty() => Err(ValidationError::RequiredFieldMissing {
                field: "title".to_string(),
            }),
            Some(title) => Ok(Self { title, description }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note(id: i32, secs: i64) -> TaskNote {
        TaskNote {
            id: NoteId(id),
            title: format!("note {}", id),
            description: None,
            created_at: Utc.timestamp_opt(secs, 0).single().unwrap(),
        }
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut n = note(7, 1_700_000_000);
        let created = n.created_at;

        n.apply(NoteDraft::new("New Title").with_description("New Description"));

        assert_eq!(n.id, NoteId(7));
        assert_eq!(n.created_at, created);
        assert_eq!(n.title, "New Title");
        assert_eq!(n.description.as_deref(), Some("New Description"));
    }

    #[test]
    fn test_apply_can_clear_description() {
        let mut n = note(1, 0);
        n.description = Some("old".to_string());
        n.apply(NoteDraft::new("t"));
        assert!(n.description.is_none());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut notes = vec![note(1, 100), note(2, 300), note(3, 200)];
        sort_newest_first(&mut notes);
        let ids: Vec<i32> = notes.iter().map(|n| n.id.get()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_ties_by_id() {
        let mut notes = vec![note(1, 100), note(3, 100), note(2, 100)];
        sort_newest_first(&mut notes);
        let ids: Vec<i32> = notes.iter().map(|n| n.id.get()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_serialization_is_camel_case() -> Result<(), serde_json::Error> {
        let n = note(1, 0);
        let json = serde_json::to_value(&n)?;

        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "note 1");
        assert!(json["description"].is_null());
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00Z");
        assert!(json.get("created_at").is_none());
        Ok(())
    }

    #[test]
    fn test_draft_parse() {
        assert!(NoteDraft::parse(Some("Buy milk".into()), None).is_ok());
        assert_eq!(
            NoteDraft::parse(None, None),
            Err(ValidationError::RequiredFieldMissing {
                field: "title".to_string()
            })
        );
        assert!(NoteDraft::parse(Some("   ".into()), Some("d".into())).is_err());
    }

    #[test]
    fn test_note_id_display() {
        assert_eq!(NoteId(42).to_string(), "42");
        assert_eq!(NoteId::from(5).get(), 5);
    }

    #[cfg(feature = "openapi")]
    #[test]
    fn test_schema_documents_created_at_as_date_time() -> Result<(), serde_json::Error> {
        use utoipa::PartialSchema;

        let schema = serde_json::to_value(TaskNote::schema())?;
        let created_at = &schema["properties"]["createdAt"];
        assert_eq!(created_at["type"], "string");
        assert_eq!(created_at["format"], "date-time");
        Ok(())
    }
}
