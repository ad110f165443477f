//! Property-Based Tests for the TaskNote API
//!
//! Drives the full router over the in-memory store with generated notes:
//! - Every created note can be fetched back unchanged
//! - Listing is always newest first and complete
//! - Updates never touch `id` or `createdAt`
//! - Blank titles are always rejected without writing anything

#[path = "support/http.rs"]
mod http_support;

use axum::http::StatusCode;
use http_support::{send, test_app};
use proptest::prelude::*;
use serde_json::json;
use tasknote_test_utils::{
    blank_title_strategy, draft_body, draft_strategy, InMemoryTaskNoteStore,
};
use tokio::runtime::Runtime;

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

fn fail(message: String) -> TestCaseError {
    TestCaseError::fail(message)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Create followed by get returns the same note.
    #[test]
    fn prop_create_then_get_round_trips(draft in draft_strategy()) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let app = test_app(InMemoryTaskNoteStore::new());

            let created = send(&app, "POST", "/api/tasknote", Some(draft_body(&draft)))
                .await
                .map_err(fail)?;
            prop_assert_eq!(created.status, StatusCode::CREATED);
            let location = created.location().map(str::to_string);
            let created = created.json().map_err(fail)?;

            prop_assert_eq!(&created["title"], &json!(draft.title));
            prop_assert_eq!(&created["description"], &json!(draft.description));

            let location = location.ok_or_else(|| fail("missing Location".to_string()))?;
            let fetched = send(&app, "GET", &location, None).await.map_err(fail)?;
            prop_assert_eq!(fetched.status, StatusCode::OK);
            prop_assert_eq!(fetched.json().map_err(fail)?, created);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Listing contains every note, ordered by descending id for sequential creates.
    #[test]
    fn prop_list_is_newest_first(drafts in prop::collection::vec(draft_strategy(), 0..12)) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let app = test_app(InMemoryTaskNoteStore::new());
            for draft in &drafts {
                let response = send(&app, "POST", "/api/tasknote", Some(draft_body(draft)))
                    .await
                    .map_err(fail)?;
                prop_assert_eq!(response.status, StatusCode::CREATED);
            }

            let listed = send(&app, "GET", "/api/tasknote", None)
                .await
                .map_err(fail)?
                .json()
                .map_err(fail)?;
            let notes = listed
                .as_array()
                .ok_or_else(|| fail("expected an array".to_string()))?;
            prop_assert_eq!(notes.len(), drafts.len());

            let ids: Vec<i64> = notes.iter().filter_map(|n| n["id"].as_i64()).collect();
            let expected: Vec<i64> = (1..=drafts.len() as i64).rev().collect();
            prop_assert_eq!(ids, expected);

            let stamps: Vec<&str> = notes.iter().filter_map(|n| n["createdAt"].as_str()).collect();
            for pair in stamps.windows(2) {
                let newer = chrono::DateTime::parse_from_rfc3339(pair[0])
                    .map_err(|e| fail(e.to_string()))?;
                let older = chrono::DateTime::parse_from_rfc3339(pair[1])
                    .map_err(|e| fail(e.to_string()))?;
                prop_assert!(newer >= older);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Updating replaces title and description and nothing else.
    #[test]
    fn prop_update_preserves_identity(
        original in draft_strategy(),
        replacement in draft_strategy(),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let app = test_app(InMemoryTaskNoteStore::new());

            let created = send(&app, "POST", "/api/tasknote", Some(draft_body(&original)))
                .await
                .map_err(fail)?
                .json()
                .map_err(fail)?;

            let response = send(&app, "PUT", "/api/tasknote/1", Some(draft_body(&replacement)))
                .await
                .map_err(fail)?;
            prop_assert_eq!(response.status, StatusCode::NO_CONTENT);

            let fetched = send(&app, "GET", "/api/tasknote/1", None)
                .await
                .map_err(fail)?
                .json()
                .map_err(fail)?;
            prop_assert_eq!(&fetched["id"], &created["id"]);
            prop_assert_eq!(&fetched["createdAt"], &created["createdAt"]);
            prop_assert_eq!(&fetched["title"], &json!(replacement.title));
            prop_assert_eq!(&fetched["description"], &json!(replacement.description));
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Blank titles are rejected on create and on update.
    #[test]
    fn prop_blank_title_rejected(title in blank_title_strategy()) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let store = InMemoryTaskNoteStore::new();
            let app = test_app(store.clone());

            let response = send(&app, "POST", "/api/tasknote", Some(json!({ "title": title })))
                .await
                .map_err(fail)?;
            prop_assert_eq!(response.status, StatusCode::BAD_REQUEST);
            prop_assert!(store.is_empty().await);

            let response = send(&app, "PUT", "/api/tasknote/1", Some(json!({ "title": title })))
                .await
                .map_err(fail)?;
            prop_assert_eq!(response.status, StatusCode::BAD_REQUEST);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
