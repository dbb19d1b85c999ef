use std::sync::Arc;
use std::time::{Duration, Instant};

use bookshelf_kernel::settings::CacheSettings;
use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use crate::error::CacheError;

/// Key/value store with per-key expiry.
///
/// The set of backends is closed: an in-process map for single-instance
/// deployments and Redis when the cache is shared. Every operation is a
/// single attempt; callers decide what a failure means.
#[derive(Clone)]
pub enum CacheStore {
    Memory(MemoryCache),
    Redis(RedisCache),
}

impl CacheStore {
    /// In-process store.
    pub fn memory() -> Self {
        CacheStore::Memory(MemoryCache::default())
    }

    /// Build the backend described by the settings.
    ///
    /// Pool creation does not connect, so an unreachable Redis is reported
    /// by the first operation rather than here.
    pub fn from_settings(settings: &CacheSettings) -> Result<Self, CacheError> {
        if !settings.enabled {
            tracing::info!("Redis disabled, using in-process book-list cache");
            return Ok(Self::memory());
        }

        tracing::info!(url = %settings.url, "using Redis book-list cache");
        RedisCache::connect(
            &settings.url,
            settings.pool_size,
            settings.op_timeout(),
        )
        .map(CacheStore::Redis)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match self {
            CacheStore::Memory(cache) => Ok(cache.get(key)),
            CacheStore::Redis(cache) => cache.get(key).await,
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        match self {
            CacheStore::Memory(cache) => {
                cache.set(key, value, ttl);
                Ok(())
            }
            CacheStore::Redis(cache) => cache.set(key, value, ttl).await,
        }
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            CacheStore::Memory(cache) => {
                cache.delete(key);
                Ok(())
            }
            CacheStore::Redis(cache) => cache.delete(key).await,
        }
    }

    /// Check that the backend answers.
    pub async fn ping(&self) -> Result<(), CacheError> {
        match self {
            CacheStore::Memory(_) => Ok(()),
            CacheStore::Redis(cache) => cache.ping().await,
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            CacheStore::Memory(_) => "memory",
            CacheStore::Redis(_) => "redis",
        }
    }
}

#[derive(Clone, Debug)]
struct CachedEntry {
    data: Vec<u8>,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedEntry {
    fn is_expired(&self) -> bool {
        self.cached_at.elapsed() >= self.ttl
    }
}

/// In-process backend. Expired entries read as misses and are evicted on read.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CachedEntry>>,
}

impl MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired() {
                tracing::debug!(key = %key, "cache hit (memory)");
                return Some(entry.data.clone());
            }
        }

        self.entries.remove_if(key, |_, entry| entry.is_expired());
        tracing::debug!(key = %key, "cache miss (memory)");
        None
    }

    fn set(&self, key: &str, data: Vec<u8>, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CachedEntry {
                data,
                cached_at: Instant::now(),
                ttl,
            },
        );
    }

    fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Redis backend over a `deadpool-redis` pool.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
}

impl RedisCache {
    /// Create a pool for `url`; `timeout` bounds waiting for, creating and
    /// recycling connections.
    pub fn connect(url: &str, pool_size: usize, timeout: Duration) -> Result<Self, CacheError> {
        let mut pool_config = deadpool_redis::PoolConfig::new(pool_size);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);

        let mut config = deadpool_redis::Config::from_url(url);
        config.pool = Some(pool_config);

        let pool = config
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        tracing::debug!(key = %key, hit = value.is_some(), "cache lookup (redis)");
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        // SET EX takes whole seconds; zero would be rejected by the server.
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        tracing::debug!(key = %key, ttl_secs, "cache set (redis)");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key).await?;
        tracing::debug!(key = %key, "cache delete (redis)");
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
