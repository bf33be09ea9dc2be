/*!
Key/value cache with expiry
*/
use async_mutex::Mutex;
use cached::stores::TimedCache;
use cached::Cached;
use std::time::{Duration, Instant};

use crate::Result;

#[async_trait::async_trait]
pub trait Cache: Send + Sync {
    /// `Ok(None)` on a miss or an expired entry
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

struct Entry {
    value: String,
    expires: Instant,
}

/// In-process cache. The `TimedCache` lifespan is an upper bound
/// on every entry, each entry additionally carries its own deadline.
pub struct MemoryCache {
    entries: Mutex<TimedCache<String, Entry>>,
}

impl MemoryCache {
    pub fn new(max_lifespan: Duration) -> Self {
        Self {
            entries: Mutex::new(TimedCache::with_lifespan(max_lifespan.as_secs().max(1))),
        }
    }
}

#[async_trait::async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut lock = self.entries.lock().await;
        let hit = lock
            .cache_get(&key.to_string())
            .map(|e| (e.value.clone(), e.expires));
        match hit {
            Some((value, expires)) if expires > Instant::now() => Ok(Some(value)),
            Some(_) => {
                lock.cache_remove(&key.to_string());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut lock = self.entries.lock().await;
        lock.cache_set(
            key.to_string(),
            Entry {
                value,
                expires: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut lock = self.entries.lock().await;
        lock.cache_remove(&key.to_string());
        Ok(())
    }
}
