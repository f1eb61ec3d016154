use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Time source for the cache. Injected so tests can advance time manually
/// instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct CacheEntry<T> {
    value: T,
    stored_at: DateTime<Utc>,
}

/// TTL cache keyed by query signature.
///
/// Owned by whichever service state needs it; there is deliberately no
/// global instance. Entries are dropped lazily on read once expired.
pub struct QueryCache<T> {
    inner: RwLock<HashMap<String, CacheEntry<T>>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()),
            clock,
        }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();

        {
            let map = self.inner.read().await;
            match map.get(key) {
                Some(entry) if now - entry.stored_at <= self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop the stale entry under a write lock.
        let mut map = self.inner.write().await;
        if let Some(entry) = map.get(key) {
            if now - entry.stored_at > self.ttl {
                map.remove(key);
            }
        }
        None
    }

    pub async fn insert(&self, key: impl Into<String>, value: T) {
        let mut map = self.inner.write().await;
        map.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: self.clock.now(),
            },
        );
    }

    pub async fn invalidate(&self, key: &str) {
        let mut map = self.inner.write().await;
        map.remove(key);
    }

    pub async fn clear(&self) {
        let mut map = self.inner.write().await;
        map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct TestClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl TestClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Utc::now()),
            })
        }

        fn advance(&self, d: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::from_std(d).unwrap();
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn fresh_entry_is_returned() {
        let clock = TestClock::new();
        let cache: QueryCache<String> =
            QueryCache::new(Duration::from_secs(300), clock.clone());

        cache.insert("teacher:42", "alice".to_string()).await;
        assert_eq!(cache.get("teacher:42").await.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn expired_entry_is_dropped() {
        let clock = TestClock::new();
        let cache: QueryCache<String> =
            QueryCache::new(Duration::from_secs(300), clock.clone());

        cache.insert("teacher:42", "alice".to_string()).await;
        clock.advance(Duration::from_secs(301));
        assert_eq!(cache.get("teacher:42").await, None);

        // A stale read must not resurrect the entry.
        assert_eq!(cache.get("teacher:42").await, None);
    }

    #[tokio::test]
    async fn invalidate_removes_entry_before_expiry() {
        let clock = TestClock::new();
        let cache: QueryCache<i32> = QueryCache::new(Duration::from_secs(60), clock.clone());

        cache.insert("k", 7).await;
        cache.invalidate("k").await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn reinsert_resets_ttl() {
        let clock = TestClock::new();
        let cache: QueryCache<i32> = QueryCache::new(Duration::from_secs(60), clock.clone());

        cache.insert("k", 1).await;
        clock.advance(Duration::from_secs(50));
        cache.insert("k", 2).await;
        clock.advance(Duration::from_secs(50));

        // 100s after the first insert but only 50s after the second.
        assert_eq!(cache.get("k").await, Some(2));
    }
}
