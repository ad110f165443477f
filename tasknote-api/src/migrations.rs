//! Embedded schema migrations.
//!
//! Migration SQL is compiled into the binary and applied in version order by
//! the `tasknote-migrate` tool. Applied versions are recorded in
//! `schema_migrations`; each migration runs in its own transaction together
//! with its bookkeeping row.

use thiserror::Error;
use tokio_postgres::Client;

/// Advisory lock key that serializes concurrent migrators.
const MIGRATION_LOCK_KEY: i64 = 0x7461_736b_6e6f_7465;

const CREATE_LEDGER_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version    BIGINT      PRIMARY KEY,
    name       TEXT        NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// A single forward-only schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub sql: &'static str,
}

/// Migrations shipped with this build.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "create_task_notes",
    sql: include_str!("../migrations/0001_create_task_notes.sql"),
}];

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Migration {version} ({name}) failed: {source}")]
    Failed {
        version: i64,
        name: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Migration versions must be strictly increasing: {previous} is followed by {next}")]
    OutOfOrder { previous: i64, next: i64 },
}

/// Applies a list of migrations to a database.
#[derive(Debug, Clone, Copy)]
pub struct Migrator<'a> {
    migrations: &'a [Migration],
}

impl Migrator<'static> {
    /// Migrator over the migrations compiled into this binary.
    pub fn embedded() -> Self {
        Self {
            migrations: MIGRATIONS,
        }
    }
}

impl<'a> Migrator<'a> {
    pub fn new(migrations: &'a [Migration]) -> Self {
        Self { migrations }
    }

    pub fn migrations(&self) -> &'a [Migration] {
        self.migrations
    }

    /// Check that versions are strictly increasing.
    pub fn validate(&self) -> Result<(), MigrationError> {
        for pair in self.migrations.windows(2) {
            if pair[1].version <= pair[0].version {
                return Err(MigrationError::OutOfOrder {
                    previous: pair[0].version,
                    next: pair[1].version,
                });
            }
        }
        Ok(())
    }

    /// Migrations whose version is not in `applied`, in version order.
    pub fn pending(&self, applied: &[i64]) -> Vec<&'a Migration> {
        self.migrations
            .iter()
            .filter(|m| !applied.contains(&m.version))
            .collect()
    }

    /// Versions recorded in the ledger. Empty when the ledger does not exist.
    pub async fn applied_versions(&self, client: &Client) -> Result<Vec<i64>, MigrationError> {
        let exists: bool = client
            .query_one("SELECT to_regclass('schema_migrations') IS NOT NULL", &[])
            .await?
            .try_get(0)?;
        if !exists {
            return Ok(Vec::new());
        }

        let rows = client
            .query("SELECT version FROM schema_migrations ORDER BY version", &[])
            .await?;
        rows.iter()
            .map(|row| row.try_get(0).map_err(MigrationError::from))
            .collect()
    }

    /// Apply every pending migration. Returns the versions applied.
    pub async fn run(&self, client: &mut Client) -> Result<Vec<i64>, MigrationError> {
        self.validate()?;
        client
            .execute("SELECT pg_advisory_lock($1)", &[&MIGRATION_LOCK_KEY])
            .await?;

        let result = self.apply_pending(client).await;

        // Released even when a migration failed; the session may be reused.
        let unlock = client
            .execute("SELECT pg_advisory_unlock($1)", &[&MIGRATION_LOCK_KEY])
            .await;
        let applied = result?;
        unlock?;
        Ok(applied)
    }

    async fn apply_pending(&self, client: &mut Client) -> Result<Vec<i64>, MigrationError> {
        client.batch_execute(CREATE_LEDGER_SQL).await?;
        let applied = self.applied_versions(client).await?;

        let mut newly_applied = Vec::new();
        for migration in self.pending(&applied) {
            tracing::info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );

            let tx = client.transaction().await?;
            tx.batch_execute(migration.sql)
                .await
                .map_err(|source| MigrationError::Failed {
                    version: migration.version,
                    name: migration.name,
                    source,
                })?;
            tx.execute(
                "INSERT INTO schema_migrations (version, name) VALUES ($1, $2)",
                &[&migration.version, &migration.name],
            )
            .await?;
            tx.commit().await?;

            newly_applied.push(migration.version);
        }
        Ok(newly_applied)
    }
}
