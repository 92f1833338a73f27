//! Short-lived cache for token lookups and airdrop cooldowns
//!
//! Redis when configured, an in-process map otherwise. Values are JSON strings.

mod memory;
mod redis;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

use crate::config::{CacheConfig, RedisConfig};
use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokenforge_core::Network;
use tracing::{info, warn};

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Store `value` only when `key` is absent; true when it was stored
    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Cache key builder sharing one prefix
#[derive(Debug, Clone)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn token(&self, network: Network, mint: &str) -> String {
        format!("{}:token:{}:{}", self.prefix, network, mint)
    }

    pub fn airdrop(&self, network: Network, address: &str) -> String {
        format!("{}:airdrop:{}:{}", self.prefix, network, address)
    }
}

/// Read and decode a cached value; cache failures and stale shapes read as a miss
pub async fn get_json<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    match cache.get(key).await {
        Ok(Some(data)) => match serde_json::from_str(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "Cache read failed");
            None
        }
    }
}

/// Encode and store a value; failures are logged and ignored
pub async fn set_json<T: Serialize>(cache: &dyn Cache, key: &str, value: &T, ttl: Duration) {
    let data = match serde_json::to_string(value) {
        Ok(data) => data,
        Err(e) => {
            warn!(key, error = %e, "Failed to encode cache entry");
            return;
        }
    };
    if let Err(e) = cache.set(key, data, ttl).await {
        warn!(key, error = %e, "Cache write failed");
    }
}

pub async fn invalidate(cache: &dyn Cache, key: &str) {
    if let Err(e) = cache.delete(key).await {
        warn!(key, error = %e, "Cache invalidation failed");
    }
}

/// Open the configured cache
pub async fn connect(redis: &RedisConfig, config: &CacheConfig) -> Result<Arc<dyn Cache>> {
    match &redis.url {
        Some(url) => {
            let cache = RedisCache::new(url).await?;
            info!("Connected to Redis");
            Ok(Arc::new(cache))
        }
        None => Ok(Arc::new(MemoryCache::new(config.max_entries))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
    }

    #[tokio::test]
    async fn json_helpers_round_trip_and_tolerate_garbage() {
        let cache = MemoryCache::new(16);
        let ttl = Duration::from_secs(30);

        set_json(&cache, "k", &Entry { name: "forge".into() }, ttl).await;
        let entry: Option<Entry> = get_json(&cache, "k").await;
        assert_eq!(entry, Some(Entry { name: "forge".into() }));

        cache.set("bad", "{not json".into(), ttl).await.unwrap();
        let entry: Option<Entry> = get_json(&cache, "bad").await;
        assert!(entry.is_none());

        invalidate(&cache, "k").await;
        let entry: Option<Entry> = get_json(&cache, "k").await;
        assert!(entry.is_none());
    }

    #[test]
    fn keys_are_scoped_by_network() {
        let keys = CacheKeys::new("tf");
        assert_eq!(keys.token(Network::Devnet, "M"), "tf:token:devnet:M");
        assert_eq!(keys.airdrop(Network::Testnet, "A"), "tf:airdrop:testnet:A");
    }
}
