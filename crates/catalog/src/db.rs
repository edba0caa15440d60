//! Catalog database: connection pool, pragmas and embedded migrations.

use exn::ResultExt;
use sqlx::{Executor, SqliteConnection};
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Imports write from a single task; searches and stats may read alongside.
const POOL_SIZE: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_millis(1500);
/// Per-connection settings not covered by [`SqliteConnectOptions`].
const CONNECTION_PRAGMAS: &str = "PRAGMA cache_size = -8192; PRAGMA temp_store = MEMORY;";

/// Handle to an open, migrated catalog.
///
/// Cheap to clone. Hand it to a [`Repository`](crate::Repository) to read and
/// write entities.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the catalog file at `path`, creating it if missing, and bring its
    /// schema up to date.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::options().filename(path.as_ref()).create_if_missing(true);
        Self::open(options, POOL_SIZE).await
    }

    /// Open a private, empty catalog that lives only as long as the pool.
    ///
    /// Available outside of tests so that dependent crates can use it in
    /// theirs.
    pub async fn connect_in_memory() -> Result<Self> {
        // Each connection to ":memory:" would see its own database.
        Self::open(Self::options().filename(":memory:"), 1).await
    }

    async fn open(options: SqliteConnectOptions, size: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(size)
            // Runs for every pooled connection, not just the first.
            .after_connect(|conn, meta| Box::pin(async move { Self::configure(conn, meta).await }))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    fn options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Books reference genres, authors and publishers.
            .foreign_keys(true)
            // A second importer holding the write lock delays us instead of failing us.
            .busy_timeout(BUSY_TIMEOUT)
    }

    async fn configure(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        conn.execute(sqlx::raw_sql(CONNECTION_PRAGMAS)).await?;
        Ok(())
    }

    #[instrument("migrating catalog schema", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Let SQLite refresh its planner statistics, then close every connection.
    ///
    /// The handle (and its clones) must not be used afterwards.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
