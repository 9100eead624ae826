//! In-process store backed by a moka cache.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;

use super::{KvStore, StoreFuture};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    ttl: Option<Duration>,
}

/// Expires each entry after its own TTL; a SET resets the clock.
struct PerEntryExpiry;

impl Expiry<String, StoredValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Bounded in-memory key-value store.
#[derive(Clone)]
pub struct MemoryStore {
    cache: Cache<String, StoredValue>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryExpiry)
            .build();
        Self { cache }
    }
}

impl KvStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.cache.get(key).await.map(|stored| stored.value)) })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Option<Duration>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.cache
                .insert(key.to_string(), StoredValue { value, ttl })
                .await;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn set_then_get() {
        let store = MemoryStore::new(16);
        store.set("a", "1".to_string(), None).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[test_log::test(tokio::test)]
    async fn set_replaces_value() {
        let store = MemoryStore::new(16);
        store.set("a", "1".to_string(), None).await.unwrap();
        store.set("a", "2".to_string(), None).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("2"));
    }

    #[test_log::test(tokio::test)]
    async fn entries_expire_after_ttl() {
        let store = MemoryStore::new(16);
        store
            .set("short", "x".to_string(), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        store.set("long", "y".to_string(), None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.get("long").await.unwrap().as_deref(), Some("y"));
    }
}
