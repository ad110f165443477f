//! TaskNote API - REST Layer
//!
//! Axum handlers, configuration, PostgreSQL persistence and observability
//! for the TaskNote service. Handlers depend only on the
//! [`tasknote_storage::TaskNoteStore`] trait, so the same router serves the
//! PostgreSQL-backed [`DbClient`] in production and the in-memory store in
//! tests.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod migrations;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod pg_repository;
pub mod retry;
pub mod routes;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use migrations::{Migration, MigrationError, Migrator, MIGRATIONS};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use retry::RetryPolicy;
pub use routes::{create_api_router, TASKNOTE_BASE_PATH};
pub use types::TaskNoteRequest;
