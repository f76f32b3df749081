use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fred::clients::Pool;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;

use crate::Error;
use crate::engine::StorageEngine;

/// A Redis storage engine.
///
/// Each session is a plain string key written with `SET .. PX`, so Redis
/// itself evicts it when the TTL elapses. Renewing reads use `GETEX .. PX`. The client (or pool) is owned by
/// the caller; [`close`](StorageEngine::close) only detaches this engine from
/// it.
#[derive(Clone, Debug)]
pub struct RedisEngine<C: KeysInterface + Clone + Send + Sync = Pool> {
    client: Arc<C>,
    closed: Arc<AtomicBool>,
}

impl<C> RedisEngine<C>
where
    C: KeysInterface + Clone + Send + Sync,
{
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        Ok(())
    }
}

impl<C> StorageEngine for RedisEngine<C>
where
    C: KeysInterface + Clone + Send + Sync + 'static,
{
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), Error> {
        self.ensure_open()?;

        // PX rejects 0, and a zero TTL means the entry is already gone.
        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        if millis == 0 {
            let _: i64 = self.client.del(key).await?;
            return Ok(());
        }

        let _: () = self
            .client
            .set(key, value.as_slice(), Some(Expiration::PX(millis)), None, false)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.ensure_open()?;
        Ok(self.client.get::<Option<Vec<u8>>, _>(key).await?)
    }

    async fn get_and_touch(&self, key: &str, ttl: Duration) -> Result<Option<Vec<u8>>, Error> {
        self.ensure_open()?;

        let millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        if millis == 0 {
            let _: i64 = self.client.del(key).await?;
            return Ok(None);
        }

        // GETEX reads and re-arms the TTL in one command and leaves missing
        // keys missing.
        Ok(self
            .client
            .getex::<Option<Vec<u8>>, _>(key, Some(Expiration::PX(millis)))
            .await?)
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.ensure_open()?;
        let _: i64 = self.client.del(key).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
