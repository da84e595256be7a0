//! Rate-limit counter stores.
//!
//! The shared counter store provides atomic increment-and-return across
//! gateway replicas; Redis is the production backend. The process-local
//! [`LocalCounter`] is the availability fallback: when the shared store is
//! unreachable the limiter keeps counting per-process, accepting up to
//! N x limit throughput across N replicas.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Failure talking to the shared counter store. Never surfaced to clients;
/// the rate limiter recovers locally.
#[derive(Debug, thiserror::Error)]
#[error("counter store error: {0}")]
pub struct CounterError(String);

impl CounterError {
    /// Counter store unreachable or misbehaving.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CounterError(reason.into())
    }
}

impl From<redis::RedisError> for CounterError {
    fn from(err: redis::RedisError) -> Self {
        CounterError(err.to_string())
    }
}

/// Shared counter store contract: atomic increment plus bucket expiry.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment `bucket` and return the new count.
    async fn incr(&self, bucket: &str) -> Result<i64, CounterError>;

    /// Arrange for `bucket` to expire after `ttl`.
    async fn expire(&self, bucket: &str, ttl: Duration) -> Result<(), CounterError>;
}

/// Redis-backed shared counter.
///
/// The connection manager is established lazily so a gateway can start
/// while Redis is down; until it comes up every increment fails and the
/// limiter runs on the local fallback.
pub struct RedisCounter {
    client: redis::Client,
    conn: tokio::sync::OnceCell<redis::aio::ConnectionManager>,
}

impl RedisCounter {
    pub fn open(url: &str) -> Result<Self, CounterError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            conn: tokio::sync::OnceCell::new(),
        })
    }

    async fn manager(&self) -> Result<redis::aio::ConnectionManager, CounterError> {
        let manager = self
            .conn
            .get_or_try_init(|| redis::aio::ConnectionManager::new(self.client.clone()))
            .await?;
        Ok(manager.clone())
    }

    /// Round-trip a PING; used by `bifrost check`.
    pub async fn ping(&self) -> Result<(), CounterError> {
        let mut conn = self.manager().await?;
        redis::cmd("PING").query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl CounterStore for RedisCounter {
    async fn incr(&self, bucket: &str) -> Result<i64, CounterError> {
        let mut conn = self.manager().await?;
        let count: i64 = redis::cmd("INCR")
            .arg(bucket)
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }

    async fn expire(&self, bucket: &str, ttl: Duration) -> Result<(), CounterError> {
        let mut conn = self.manager().await?;
        redis::cmd("EXPIRE")
            .arg(bucket)
            .arg(ttl.as_secs())
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}

/// In-process implementation of the shared-counter contract.
///
/// Serves the in-memory backend in development and deterministic tests; it
/// is "shared" only within one process.
#[derive(Default)]
pub struct MemoryCounter {
    counts: Mutex<HashMap<String, i64>>,
}

impl MemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for MemoryCounter {
    async fn incr(&self, bucket: &str) -> Result<i64, CounterError> {
        let mut counts = self.counts.lock().expect("counter lock poisoned");
        let entry = counts.entry(bucket.to_string()).or_insert(0);
        *entry += 1;
        Ok(*entry)
    }

    async fn expire(&self, _bucket: &str, _ttl: Duration) -> Result<(), CounterError> {
        // Buckets are minute-scoped; stale entries are harmless here and the
        // map only lives as long as a dev process or test.
        Ok(())
    }
}

struct LocalEntry {
    count: i64,
    since: Instant,
}

/// Per-process fallback counter used when the shared store errors.
///
/// An entry resets once its bucket timestamp is older than one minute,
/// mirroring the shared store's bucket expiry.
#[derive(Default)]
pub struct LocalCounter {
    entries: Mutex<HashMap<String, LocalEntry>>,
}

const BUCKET_WINDOW: Duration = Duration::from_secs(60);

impl LocalCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `bucket`, resetting it first when its window has lapsed.
    pub fn incr(&self, bucket: &str) -> i64 {
        let mut entries = self.entries.lock().expect("local counter lock poisoned");

        // Stale buckets accumulate one per key per minute during an outage.
        if entries.len() > 1024 {
            entries.retain(|_, e| e.since.elapsed() < BUCKET_WINDOW * 2);
        }

        let now = Instant::now();
        let entry = entries.entry(bucket.to_string()).or_insert(LocalEntry {
            count: 0,
            since: now,
        });
        if entry.since.elapsed() >= BUCKET_WINDOW {
            entry.count = 0;
            entry.since = now;
        }
        entry.count += 1;
        entry.count
    }
}
