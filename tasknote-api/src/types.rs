//! API Request Types
//!
//! Wire shapes accepted by the note endpoints. Responses use
//! [`tasknote_core::TaskNote`] directly.

use serde::{Deserialize, Serialize};
use tasknote_core::{NoteDraft, ValidationError};

/// Body of `POST /api/tasknote` and `PUT /api/tasknote/{id}`.
///
/// `id` and `createdAt` are ignored if present; storage owns them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TaskNoteRequest {
    /// Required, must not be blank
    #[cfg_attr(feature = "openapi", schema(example = "Buy milk"))]
    pub title: Option<String>,

    #[cfg_attr(feature = "openapi", schema(example = "2 liters"))]
    pub description: Option<String>,
}

impl TaskNoteRequest {
    /// Validate into a draft.
    pub fn into_draft(self) -> Result<NoteDraft, ValidationError> {
        NoteDraft::parse(self.title, self.description)
    }
}
