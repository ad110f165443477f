//! End-to-end smoke tests against a real PostgreSQL database.
//!
//! Run with `--features db-tests` and `TASKNOTE_DATABASE_URL` pointing at a
//! disposable database.

#![cfg(feature = "db-tests")]

#[path = "support/http.rs"]
mod http_support;

use axum::http::StatusCode;
use http_support::{send, test_app};
use serde_json::json;
use tasknote_api::{ApiResult, DbClient, DbConfig, Migrator};
use tasknote_storage::TaskNoteStore;
use tasknote_test_utils::NoteDraft;

async fn migrated_db() -> ApiResult<DbClient> {
    let db = DbClient::from_config(&DbConfig::from_env())?;
    db.wait_until_ready().await?;
    db.migrate().await?;
    Ok(db)
}

#[tokio::test]
async fn smoke_test_migrations_are_idempotent() -> ApiResult<()> {
    let db = migrated_db().await?;

    assert!(db.migrate().await?.is_empty());
    assert!(db.pending_migrations().await?.is_empty());
    assert_eq!(Migrator::embedded().migrations().len(), 1);
    Ok(())
}

#[tokio::test]
async fn smoke_test_repository_crud_chain() -> ApiResult<()> {
    let db = migrated_db().await?;

    let repo = db.open().await?;
    let created = repo
        .create(NoteDraft::new("smoke-test-note").with_description("End-to-end CRUD test"))
        .await?;
    assert!(created.id.get() > 0);

    let fetched = repo.get_by_id(created.id).await?;
    assert_eq!(fetched.as_ref(), Some(&created));

    let mut changed = created.clone();
    changed.title = "smoke-test-note (edited)".to_string();
    assert!(repo.update(&changed).await?);
    repo.commit().await?;

    let reread = db.open().await?.get_by_id(created.id).await?;
    assert_eq!(reread.as_ref().map(|n| n.title.as_str()), Some("smoke-test-note (edited)"));
    assert_eq!(reread.map(|n| n.created_at), Some(created.created_at));

    let listed = repo.list_all().await?;
    assert!(listed.iter().any(|n| n.id == created.id));

    assert!(repo.delete(&changed).await?);
    assert!(!repo.delete(&changed).await?);
    assert!(repo.get_by_id(created.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn smoke_test_uncommitted_update_is_discarded() -> ApiResult<()> {
    let db = migrated_db().await?;

    let created = db.open().await?.create(NoteDraft::new("keep me")).await?;

    {
        let repo = db.open().await?;
        let mut changed = created.clone();
        changed.title = "lost".to_string();
        assert!(repo.update(&changed).await?);
    }

    let reread = db.open().await?.get_by_id(created.id).await?;
    assert_eq!(reread.map(|n| n.title), Some("keep me".to_string()));

    db.open().await?.delete(&created).await?;
    Ok(())
}

#[tokio::test]
async fn smoke_test_http_lifecycle() -> Result<(), String> {
    let db = migrated_db().await.map_err(|e| e.to_string())?;
    let app = test_app(db);

    let created = send(
        &app,
        "POST",
        "/api/tasknote",
        Some(json!({ "title": "Buy milk", "description": "2 liters" })),
    )
    .await?;
    assert_eq!(created.status, StatusCode::CREATED);
    let location = created.location().ok_or("missing Location")?.to_string();

    let created_id = created.json()?["id"].clone();
    let listed = send(&app, "GET", "/api/tasknote", None).await?.json()?;
    let listed = listed.as_array().ok_or("expected an array")?;
    assert!(listed.iter().any(|note| note["id"] == created_id));

    let updated = send(
        &app,
        "PUT",
        &location,
        Some(json!({ "title": "Buy milk", "description": "3 liters" })),
    )
    .await?;
    assert_eq!(updated.status, StatusCode::NO_CONTENT);

    let fetched = send(&app, "GET", &location, None).await?.json()?;
    assert_eq!(fetched["description"], "3 liters");

    let deleted = send(&app, "DELETE", &location, None).await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = send(&app, "GET", &location, None).await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let ready = send(&app, "GET", "/health/ready", None).await?;
    assert_eq!(ready.status, StatusCode::OK);
    Ok(())
}
