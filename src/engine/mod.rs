//! Storage engines backing a [`SessionStore`](crate::SessionStore).
//!
//! An engine is a flat key-value map whose entries carry their own TTL. The
//! engine is the only authority on expiry: an entry whose TTL has elapsed must
//! be reported as absent by [`StorageEngine::get`], exactly like a key that
//! was never written.

use std::future::Future;
use std::time::Duration;

use crate::{Config, Error};

mod memory;
pub use memory::MemoryEngine;

mod sqlite;
pub use sqlite::SqliteEngine;

#[cfg(feature = "redis-store")]
mod redis;
#[cfg(feature = "redis-store")]
pub use redis::RedisEngine;

pub trait StorageEngine: Send + Sync + 'static {
    /// Writes `value` at `key`, replacing any previous entry, and makes it
    /// expire `ttl` from now.
    fn put(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Reads the value at `key`.
    ///
    /// Returns `None` if the key is absent or expired.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, Error>> + Send;

    /// Reads the value at `key` and, if it is live, makes it expire `ttl`
    /// from now. The read and the deadline update are one atomic step, so a
    /// concurrent [`delete`](Self::delete) is never undone.
    ///
    /// Returns `None` if the key is absent or expired, in which case nothing
    /// is written.
    fn get_and_touch(
        &self,
        key: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, Error>> + Send;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Releases the underlying handle. Later calls fail with [`Error::Closed`].
    fn close(&self) -> impl Future<Output = Result<(), Error>> + Send;
}

/// The engine selected by [`Config::in_memory`].
#[derive(Debug)]
pub enum LocalEngine {
    Memory(MemoryEngine),
    Sqlite(SqliteEngine),
}

impl LocalEngine {
    pub fn open(config: &Config) -> Result<Self, Error> {
        if config.in_memory {
            Ok(LocalEngine::Memory(MemoryEngine::new()))
        } else {
            SqliteEngine::open(&config.directory).map(LocalEngine::Sqlite)
        }
    }
}

impl StorageEngine for LocalEngine {
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), Error> {
        match self {
            LocalEngine::Memory(engine) => engine.put(key, value, ttl).await,
            LocalEngine::Sqlite(engine) => engine.put(key, value, ttl).await,
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        match self {
            LocalEngine::Memory(engine) => engine.get(key).await,
            LocalEngine::Sqlite(engine) => engine.get(key).await,
        }
    }

    async fn get_and_touch(&self, key: &str, ttl: Duration) -> Result<Option<Vec<u8>>, Error> {
        match self {
            LocalEngine::Memory(engine) => engine.get_and_touch(key, ttl).await,
            LocalEngine::Sqlite(engine) => engine.get_and_touch(key, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        match self {
            LocalEngine::Memory(engine) => engine.delete(key).await,
            LocalEngine::Sqlite(engine) => engine.delete(key).await,
        }
    }

    async fn close(&self) -> Result<(), Error> {
        match self {
            LocalEngine::Memory(engine) => engine.close().await,
            LocalEngine::Sqlite(engine) => engine.close().await,
        }
    }
}
