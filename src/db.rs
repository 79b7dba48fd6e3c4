use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, warn};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Embedded schema migrations, applied on startup and by the test harness
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Number of attempts made by [`with_retry`] before giving up
const MAX_ATTEMPTS: u32 = 5;

/// Base delay between attempts; doubled on every retry
const BASE_DELAY: Duration = Duration::from_millis(20);

/// Applies per-connection pragmas every time the pool opens a connection
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the connection pool for the given SQLite database URL
///
/// ### Errors
///
/// Returns an error if the pool cannot open its initial connections.
pub fn init_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;
    Ok(pool)
}

/// Runs every pending embedded migration on the given connection
pub fn run_migrations(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    debug!("Applied {} migrations", applied.len());
    Ok(())
}

/// Errors that can tell whether SQLite gave up because of lock contention
pub trait BusyError {
    fn is_busy(&self) -> bool;
}

impl BusyError for DieselError {
    fn is_busy(&self) -> bool {
        match self {
            DieselError::DatabaseError(_, info) => {
                let message = info.message();
                message.contains("database is locked") || message.contains("database is busy")
            }
            _ => false,
        }
    }
}

impl BusyError for anyhow::Error {
    fn is_busy(&self) -> bool {
        self.downcast_ref::<DieselError>().is_some_and(BusyError::is_busy)
    }
}

/// Runs `op` against the connection, retrying while SQLite reports the
/// database as locked or busy
///
/// The operation is re-run from scratch on each attempt, so it must be safe to
/// repeat (a single statement or a whole transaction).
pub async fn with_retry<T, E, F>(conn: &mut SqliteConnection, mut op: F) -> Result<T, E>
where
    E: BusyError,
    F: FnMut(&mut SqliteConnection) -> Result<T, E>,
{
    let mut delay = BASE_DELAY;
    let mut attempt = 1;
    loop {
        match op(conn) {
            Err(e) if e.is_busy() && attempt < MAX_ATTEMPTS => {
                warn!(attempt, "Database busy, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            result => return result,
        }
    }
}
