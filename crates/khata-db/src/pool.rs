//! # Database Handle
//!
//! Opens the SQLite file, configures its pragmas, owns the connection
//! pool, and hands out repositories.
//!
//! The ledger has one writer (the recorder, one transaction per commit)
//! and many readers (the report services). WAL journaling keeps those
//! read paths off the writer's lock:
//!
//! ```text
//!                 Database (cheap to clone)
//!                      │
//!              ┌───────┴────────┐
//!              ▼                ▼
//!       recorder writes    report reads
//!       tx on one conn     each on its own pooled conn
//! ```
//!
//! Pragmas applied on connect: WAL journal, NORMAL synchronous (durable
//! against corruption; a crash may drop the last transaction), foreign
//! keys on.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::product::ProductRepository;
use crate::repository::purchase::PurchaseRepository;
use crate::repository::sale::SaleRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Pool and migration settings, built up from `DbConfig::new(path)`.
///
/// The defaults suit a single-shop deployment; override with the builder
/// methods where they don't fit:
///
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/khata.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file location, created on first open.
    pub database_path: PathBuf,

    /// Pool size ceiling (default 5).
    pub max_connections: u32,

    /// Connections kept warm (default 1).
    pub min_connections: u32,

    /// How long an acquire may wait (default 30s).
    pub connect_timeout: Duration,

    /// Idle time before a pooled connection is dropped (default 10min).
    pub idle_timeout: Duration,

    /// Apply pending migrations during `Database::new` (default true).
    pub run_migrations: bool,
}

impl DbConfig {
    /// Configuration with defaults for the given database file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Configuration for an isolated in-memory database, used by tests.
    ///
    /// Pinned to a single connection: each connection to `:memory:` would
    /// otherwise see its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle over the connection pool; the root of all persistence access.
///
/// There is no process-wide singleton. Each service is handed its own
/// clone (the pool inside is reference-counted, so clones are cheap) and
/// reaches the tables through the repository accessors:
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./khata.db")).await?;
/// let product = db.products().get_by_id("...").await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file, builds the pool, and
    /// applies pending migrations unless `config.run_migrations` is off.
    ///
    /// Fails with `DbError::ConnectionFailed` when the file cannot be
    /// opened, or a migration error when the schema cannot be brought up
    /// to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL under WAL: a crash can lose the last commit, never
            // corrupt the file.
            .synchronous(SqliteSynchronous::Normal)
            // Off by default in SQLite; the line tables rely on them.
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations in order. Idempotent; `new()` already
    /// calls this unless the config disabled it.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// The raw pool, for starting transactions (`pool().begin()`) and the
    /// odd query no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the product repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Returns the purchase repository.
    pub fn purchases(&self) -> PurchaseRepository {
        PurchaseRepository::new(self.pool.clone())
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Closes the pool on shutdown. Repository calls error out after this.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// True when the database still answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let config = DbConfig::in_memory();
        let db = Database::new(config).await.unwrap();

        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
    }

    #[tokio::test]
    async fn test_migration_status_after_connect() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();

        assert!(total >= 2);
        assert_eq!(total, applied);
    }
}
