//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres. Connection
//! acquisition goes through the configured [`RetryPolicy`], so brief database
//! outages surface as slower requests instead of failures.

use crate::error::ApiResult;
use crate::migrations::{MigrationError, Migrator};
use crate::pg_repository::PgTaskNoteRepository;
use crate::retry::{RetryPolicy, Transient};
use async_trait::async_trait;
use deadpool_postgres::{
    Config, ManagerConfig, Object, Pool, PoolConfig, PoolError, RecyclingMethod, Runtime,
};
use std::time::Duration;
use tasknote_core::{StorageError, StorageResult};
use tasknote_storage::{TaskNoteRepository, TaskNoteStore};
use tokio_postgres::error::SqlState;
use tokio_postgres::NoTls;

const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost:5432/tasknote";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL connection string
    pub url: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait and connect timeout
    pub timeout: Duration,
    /// Backoff for transient connection failures
    pub retry: RetryPolicy,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        let max_retry_delay = parsed("TASKNOTE_DB_MAX_RETRY_DELAY")
            .map(Duration::from_secs)
            .unwrap_or(defaults.retry.max_backoff);

        Self {
            url: lookup("TASKNOTE_DATABASE_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.url),
            max_size: parsed("TASKNOTE_DB_POOL_SIZE")
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_size),
            timeout: parsed("TASKNOTE_DB_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retry: RetryPolicy {
                max_retries: parsed("TASKNOTE_DB_MAX_RETRIES")
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(defaults.retry.max_retries),
                max_backoff: max_retry_delay,
                initial_backoff: defaults.retry.initial_backoff.min(max_retry_delay),
                ..defaults.retry
            },
        }
    }

    /// Create a connection pool from this configuration.
    ///
    /// No connection is opened until the pool is first used.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.url = Some(self.url.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        pool_cfg.timeouts.recycle = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;
        Ok(pool)
    }
}

// ============================================================================
// ERROR CLASSIFICATION
// ============================================================================

impl Transient for PoolError {
    fn is_transient(&self) -> bool {
        match self {
            PoolError::Timeout(_) => true,
            PoolError::Backend(err) => is_transient_pg_error(err),
            _ => false,
        }
    }
}

/// Connection-level failures: I/O errors, closed sockets and the SQLSTATE
/// classes a restarting or overloaded server reports.
pub fn is_transient_pg_error(err: &tokio_postgres::Error) -> bool {
    if err.is_closed() {
        return true;
    }
    match err.code() {
        None => true,
        Some(code) => {
            code.code().starts_with("08")
                || *code == SqlState::TOO_MANY_CONNECTIONS
                || *code == SqlState::ADMIN_SHUTDOWN
                || *code == SqlState::CRASH_SHUTDOWN
                || *code == SqlState::CANNOT_CONNECT_NOW
        }
    }
}

/// Map a pool failure onto the storage error vocabulary.
pub fn pool_storage_error(err: PoolError) -> StorageError {
    match err {
        PoolError::Timeout(_) => StorageError::PoolExhausted,
        PoolError::Closed => StorageError::unavailable("connection pool is closed"),
        other => StorageError::unavailable(other.to_string()),
    }
}

/// Map a statement failure onto the storage error vocabulary.
pub fn pg_storage_error(operation: &str, err: tokio_postgres::Error) -> StorageError {
    if err.is_closed() || err.as_db_error().is_none() {
        StorageError::unavailable(err.to_string())
    } else {
        StorageError::query_failed(operation, err.to_string())
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps a connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
    retry: RetryPolicy,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool, config.retry.clone()))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Get a connection from the pool, retrying transient failures.
    pub async fn get_conn(&self) -> Result<Object, PoolError> {
        self.retry
            .run("acquire_connection", || self.pool.get())
            .await
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> StorageResult<()> {
        let conn = self.pool.get().await.map_err(pool_storage_error)?;
        conn.query_one("SELECT 1", &[])
            .await
            .map_err(|e| pg_storage_error("health_check", e))?;
        Ok(())
    }

    /// Block until the database answers, within the retry budget.
    pub async fn wait_until_ready(&self) -> StorageResult<()> {
        let conn = self.get_conn().await.map_err(pool_storage_error)?;
        conn.query_one("SELECT 1", &[])
            .await
            .map_err(|e| pg_storage_error("wait_until_ready", e))?;
        tracing::info!(pool_size = self.pool_size(), "Database connection established");
        Ok(())
    }

    /// Versions of embedded migrations the database has not recorded.
    pub async fn pending_migrations(&self) -> Result<Vec<i64>, MigrationError> {
        let conn = self.get_conn().await?;
        let migrator = Migrator::embedded();
        let applied = migrator.applied_versions(&conn).await?;
        Ok(migrator
            .pending(&applied)
            .into_iter()
            .map(|m| m.version)
            .collect())
    }

    /// Apply all pending embedded migrations.
    pub async fn migrate(&self) -> Result<Vec<i64>, MigrationError> {
        let mut conn = self.get_conn().await?;
        Migrator::embedded().run(&mut conn).await
    }
}

#[async_trait]
impl TaskNoteStore for DbClient {
    async fn open(&self) -> StorageResult<Box<dyn TaskNoteRepository>> {
        let conn = self.get_conn().await.map_err(pool_storage_error)?;
        Ok(Box::new(PgTaskNoteRepository::new(conn)))
    }

    async fn ping(&self) -> StorageResult<()> {
        self.health_check().await
    }
}
