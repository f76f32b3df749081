use crate::Error;
use crate::engine::StorageEngine;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

// ~100 years, used when `now + ttl` does not fit in an `Instant`.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct StoredValue {
    data: Vec<u8>,
    expires_at: Instant,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or(now + MAX_TTL)
}

/// An in-memory storage engine.
///
/// Entries live in a [`DashMap`] and are dropped once their deadline has
/// passed. Reads never return an expired entry; the full sweep over the map
/// runs on write at most once per sweep interval (one minute by default).
/// Nothing is persisted, so every session is lost when the process exits.
#[derive(Debug)]
pub struct MemoryEngine {
    data: DashMap<String, StoredValue>,
    closed: AtomicBool,
    sweep_interval: Duration,
    last_sweep: Mutex<Instant>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine that sweeps expired entries at most once per
    /// `sweep_interval`.
    pub fn with_sweep_interval(sweep_interval: Duration) -> Self {
        Self {
            data: DashMap::new(),
            closed: AtomicBool::new(false),
            sweep_interval,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        Ok(())
    }

    fn cleanup_expired(&self) {
        let now = Instant::now();
        {
            // Another writer holding the lock is already sweeping.
            let Some(mut last_sweep) = self.last_sweep.try_lock() else {
                return;
            };
            if now.duration_since(*last_sweep) < self.sweep_interval {
                return;
            }
            *last_sweep = now;
        }

        self.data.retain(|_, value| value.is_live(now));
    }
}

impl StorageEngine for MemoryEngine {
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), Error> {
        self.ensure_open()?;
        self.cleanup_expired();

        self.data.insert(
            key.to_string(),
            StoredValue {
                data: value,
                expires_at: deadline(Instant::now(), ttl),
            },
        );

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.ensure_open()?;

        let now = Instant::now();
        if let Some(value) = self.data.get(key) {
            if value.is_live(now) {
                return Ok(Some(value.data.clone()));
            }
        }

        // The read guard above is released before touching the shard again.
        self.data.remove_if(key, |_, value| !value.is_live(now));
        Ok(None)
    }

    async fn get_and_touch(&self, key: &str, ttl: Duration) -> Result<Option<Vec<u8>>, Error> {
        self.ensure_open()?;

        let now = Instant::now();
        // The shard stays write-locked between the liveness check and the
        // deadline update.
        if let Some(mut value) = self.data.get_mut(key) {
            if value.is_live(now) {
                value.expires_at = deadline(now, ttl);
                return Ok(Some(value.data.clone()));
            }
        }

        self.data.remove_if(key, |_, value| !value.is_live(now));
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.ensure_open()?;
        self.data.remove(key);
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.data.clear();
        }
        Ok(())
    }
}
