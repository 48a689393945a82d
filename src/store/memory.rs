//! Process-local document store.
//!
//! Used for tests and single-process development. Expiry is checked lazily on access.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{DocumentStore, StoreError};

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

#[derive(Default)]
struct Inner {
    values: HashMap<String, Entry>,
    sets: HashMap<String, HashSet<String>>,
}

impl Inner {
    fn live_value(&mut self, key: &str) -> Option<&Value> {
        let now = Instant::now();
        if self.values.get(key).is_some_and(|e| !e.is_live(now)) {
            self.values.remove(key);
        }
        self.values.get(key).map(|e| &e.value)
    }

    fn add_to_counter(&mut self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let current = match self.live_value(key) {
            None => 0,
            Some(value) => value
                .as_i64()
                .ok_or_else(|| StoreError::msg(format!("value at {} is not an integer", key)))?,
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::msg(format!("counter at {} would overflow", key)))?;
        // INCR keeps an existing TTL; so do we.
        let expires_at = self.values.get(key).and_then(|e| e.expires_at);
        self.values.insert(
            key.to_string(),
            Entry {
                value: Value::from(next),
                expires_at,
            },
        );
        Ok(next)
    }
}

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Translate a store glob (`*`, `?`) into an anchored regex.
pub(crate) fn glob_to_regex(pattern: &str) -> Result<Regex, StoreError> {
    let mut re = String::with_capacity(pattern.len() + 2);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(StoreError::new)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.live_value(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.values.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &Value,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.values.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.values.remove(key);
        inner.sets.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        self.inner.lock().await.add_to_counter(key, 1)
    }

    async fn decr(&self, key: &str) -> Result<i64, StoreError> {
        self.inner.lock().await.add_to_counter(key, -1)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn srem(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(set) = inner.sets.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                inner.sets.remove(key);
            }
        }
        Ok(())
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.sets.get(key).is_some_and(|set| set.contains(member)))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let matcher = glob_to_regex(pattern)?;
        let inner = self.inner.lock().await;
        let now = Instant::now();

        let mut keys: Vec<String> = inner
            .values
            .iter()
            .filter(|(_, entry)| entry.is_live(now))
            .map(|(key, _)| key)
            .chain(inner.sets.keys())
            .filter(|key| matcher.is_match(key))
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_set_del() {
        let store = MemoryStore::new();
        assert_eq!(store.get("reviews").await.unwrap(), None);

        store.set("reviews", &json!([{"id": "a"}])).await.unwrap();
        assert_eq!(
            store.get("reviews").await.unwrap(),
            Some(json!([{"id": "a"}]))
        );

        store.del("reviews").await.unwrap();
        assert_eq!(store.get("reviews").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_counters_start_from_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.incr("article:1:views").await.unwrap(), 1);
        assert_eq!(store.incr("article:1:views").await.unwrap(), 2);
        assert_eq!(store.decr("article:1:views").await.unwrap(), 1);
        assert_eq!(store.get("article:1:views").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_incr_rejects_non_integer() {
        let store = MemoryStore::new();
        store.set("people", &json!([])).await.unwrap();
        assert!(store.incr("people").await.is_err());
    }

    #[tokio::test]
    async fn test_counter_overflow_is_an_error() {
        let store = MemoryStore::new();
        store.set("article:1:views", &json!(i64::MAX)).await.unwrap();
        assert!(store.incr("article:1:views").await.is_err());

        store.set("article:2:views", &json!(i64::MIN)).await.unwrap();
        assert!(store.decr("article:2:views").await.is_err());
        assert_eq!(
            store.get("article:1:views").await.unwrap(),
            Some(json!(i64::MAX))
        );
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = MemoryStore::new();
        store
            .set_with_ttl("admin_session:t", &json!(true), Duration::from_millis(30))
            .await
            .unwrap();
        assert_eq!(
            store.get("admin_session:t").await.unwrap(),
            Some(json!(true))
        );

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.get("admin_session:t").await.unwrap(), None);
        assert!(store.keys("admin_session:*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sets() {
        let store = MemoryStore::new();
        store.sadd("article:1:likedBy", "u1").await.unwrap();
        store.sadd("article:1:likedBy", "u1").await.unwrap();
        assert!(store.sismember("article:1:likedBy", "u1").await.unwrap());
        assert!(!store.sismember("article:1:likedBy", "u2").await.unwrap());

        store.srem("article:1:likedBy", "u1").await.unwrap();
        assert!(!store.sismember("article:1:likedBy", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_glob() {
        let store = MemoryStore::new();
        store.incr("article:a:views").await.unwrap();
        store.incr("article:b:views").await.unwrap();
        store.incr("article:a:likes").await.unwrap();
        store.set("reviews", &json!([])).await.unwrap();

        let keys = store.keys("article:*:views").await.unwrap();
        assert_eq!(keys, vec!["article:a:views", "article:b:views"]);
    }

    #[test]
    fn test_glob_escapes_regex_metacharacters() {
        let re = glob_to_regex("a.b?c*").unwrap();
        assert!(re.is_match("a.bXc"));
        assert!(re.is_match("a.b1cdef"));
        assert!(!re.is_match("aXb1c"));
    }
}
