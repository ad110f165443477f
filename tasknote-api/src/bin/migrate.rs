//! Schema Migration Tool
//!
//! Applies the migrations embedded in this build to the database named by
//! `TASKNOTE_DATABASE_URL`.
//!
//! Usage:
//!   tasknote-migrate          apply pending migrations
//!   tasknote-migrate status   list applied and pending migrations

use tasknote_api::telemetry::{init_tracing, TelemetryConfig};
use tasknote_api::{ApiError, ApiResult, DbClient, DbConfig, Migrator};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing(&TelemetryConfig::default())?;

    let db = DbClient::from_config(&DbConfig::from_env())?;
    db.wait_until_ready().await?;

    match std::env::args().nth(1).as_deref() {
        None | Some("up") => {
            let applied = db.migrate().await?;
            if applied.is_empty() {
                tracing::info!("Schema is up to date");
            } else {
                tracing::info!(?applied, "Migrations applied");
            }
            Ok(())
        }
        Some("status") => {
            let pending = db.pending_migrations().await?;
            for migration in Migrator::embedded().migrations() {
                let state = if pending.contains(&migration.version) {
                    "pending"
                } else {
                    "applied"
                };
                println!("{:>4}  {:<32} {}", migration.version, migration.name, state);
            }
            Ok(())
        }
        Some(other) => Err(ApiError::internal_error(format!(
            "Unknown command '{}'; expected 'up' or 'status'",
            other
        ))),
    }
}
