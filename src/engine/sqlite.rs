use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};

use crate::Error;
use crate::engine::StorageEngine;

const DB_FILE: &str = "sessions.db";

/// A persistent storage engine backed by a SQLite database.
///
/// Database path: `{directory}/sessions.db`
///
/// Each entry stores its absolute deadline in milliseconds since the Unix
/// epoch. Reads only match rows whose deadline lies in the future, so an
/// expired session is indistinguishable from a missing one. Expired rows are
/// pruned on write.
///
/// Calls share one connection and run on tokio's blocking pool. A renewing
/// read is a single `UPDATE .. RETURNING` statement, so it cannot interleave
/// with a delete of the same key.
#[derive(Clone)]
pub struct SqliteEngine {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl fmt::Debug for SqliteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteEngine")
            .field("open", &self.conn.lock().is_some())
            .finish()
    }
}

impl SqliteEngine {
    /// Opens (or creates) the session database inside `directory`.
    pub fn open(directory: &Path) -> Result<Self, Error> {
        std::fs::create_dir_all(directory).map_err(|err| {
            Error::Configuration(format!(
                "failed to create session directory {}: {err}",
                directory.display()
            ))
        })?;

        let path = directory.join(DB_FILE);
        let conn = Connection::open(&path).map_err(|err| {
            Error::Configuration(format!(
                "failed to open session database {}: {err}",
                path.display()
            ))
        })?;

        Self::from_connection(conn)
    }

    /// Opens a private database that lives only as long as this engine.
    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .map_err(|err| Error::Configuration(err.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, Error> {
        Self::init_schema(&conn).map_err(|err| {
            Error::Configuration(format!("failed to initialize session schema: {err}"))
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                key         TEXT PRIMARY KEY NOT NULL,
                value       BLOB NOT NULL,
                expires_at  INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);",
        )
    }

    /// Runs `f` against the open connection on the blocking pool.
    async fn with_conn<F, R>(&self, f: F) -> Result<R, Error>
    where
        F: FnOnce(&Connection) -> Result<R, Error> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            let conn = guard.as_ref().ok_or(Error::Closed)?;
            f(conn)
        })
        .await?
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

impl StorageEngine for SqliteEngine {
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), Error> {
        let key = key.to_string();
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        self.with_conn(move |conn| {
            let now = now_millis();
            conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
            conn.execute(
                "INSERT INTO sessions (key, value, expires_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    expires_at = excluded.expires_at",
                params![key, value, now.saturating_add(ttl_millis)],
            )?;
            Ok(())
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let key = key.to_string();

        self.with_conn(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM sessions WHERE key = ?1 AND expires_at > ?2",
                    params![key, now_millis()],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn get_and_touch(&self, key: &str, ttl: Duration) -> Result<Option<Vec<u8>>, Error> {
        let key = key.to_string();
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        self.with_conn(move |conn| {
            let now = now_millis();
            let value = conn
                .query_row(
                    "UPDATE sessions SET expires_at = ?3
                     WHERE key = ?1 AND expires_at > ?2
                     RETURNING value",
                    params![key, now, now.saturating_add(ttl_millis)],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let key = key.to_string();

        self.with_conn(move |conn| {
            conn.execute("DELETE FROM sessions WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }

    async fn close(&self) -> Result<(), Error> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || match conn.lock().take() {
            Some(conn) => conn.close().map_err(|(_, err)| Error::from(err)),
            None => Ok(()),
        })
        .await?
    }
}
