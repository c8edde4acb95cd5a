use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use domain::DomainError;
use std::time::Duration;
use tracing::info;

pub mod schema;
pub use schema::*;

pub type SqlitePool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type PooledSqlite = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Applied to every pooled connection when it is opened.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        // WAL: readers never block the pending unit of work's COMMIT
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL;",
            self.busy_timeout.as_millis()
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the SQLite file at `database_path` and
    /// makes sure the `users` table exists.
    pub fn new(database_path: &str) -> Result<Self, DomainError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_path);
        let pool = r2d2::Pool::builder()
            .connection_customizer(Box::new(ConnectionOptions {
                busy_timeout: BUSY_TIMEOUT,
            }))
            .build(manager)
            .map_err(|e| DomainError::repository(format!("Failed to create SQLite connection pool: {e}")))?;

        let database = Database { pool };
        database.initialize()?;
        info!(database_path, "SQLite database ready");
        Ok(database)
    }

    fn initialize(&self) -> Result<(), DomainError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| DomainError::repository(e.to_string()))?;

        diesel::sql_query(CREATE_USERS_TABLE)
            .execute(&mut conn)
            .map_err(|e| DomainError::repository(e.to_string()))?;

        Ok(())
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }
}
