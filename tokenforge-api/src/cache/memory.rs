//! In-process TTL cache

use super::Cache;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// TTL map holding at most `max_entries` keys
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    fn make_room(entries: &mut HashMap<String, Entry>, max_entries: usize, now: Instant) {
        if entries.len() < max_entries {
            return;
        }
        entries.retain(|_, entry| entry.expires_at > now);

        // Still full: drop whatever expires soonest
        while entries.len() >= max_entries {
            let soonest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(key, _)| key.clone());
            match soonest {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        if !entries.contains_key(key) {
            Self::make_room(&mut entries, self.max_entries, now);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        if entries.get(key).is_some_and(|entry| entry.expires_at > now) {
            return Ok(false);
        }
        entries.remove(key);
        Self::make_room(&mut entries, self.max_entries, now);
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_expire() {
        let cache = MemoryCache::new(8);
        cache
            .set("short", "v".into(), Duration::from_millis(20))
            .await
            .unwrap();
        assert_eq!(cache.get("short").await.unwrap().as_deref(), Some("v"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("short").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_if_absent_respects_live_entries() {
        let cache = MemoryCache::new(8);
        let ttl = Duration::from_secs(60);
        assert!(cache.set_if_absent("k", "1".into(), ttl).await.unwrap());
        assert!(!cache.set_if_absent("k", "2".into(), ttl).await.unwrap());
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("1"));

        cache.delete("k").await.unwrap();
        assert!(cache.set_if_absent("k", "3".into(), ttl).await.unwrap());
    }

    #[tokio::test]
    async fn capacity_is_bounded() {
        let cache = MemoryCache::new(2);
        cache.set("a", "1".into(), Duration::from_secs(10)).await.unwrap();
        cache.set("b", "2".into(), Duration::from_secs(20)).await.unwrap();
        cache.set("c", "3".into(), Duration::from_secs(30)).await.unwrap();

        assert!(cache.get("a").await.unwrap().is_none());
        assert!(cache.get("b").await.unwrap().is_some());
        assert!(cache.get("c").await.unwrap().is_some());
    }
}
