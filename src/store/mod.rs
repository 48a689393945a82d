//! Document store abstraction.
//!
//! The document store is the sole system of record: every collection, singleton,
//! counter and session lives under one key. Backends are interchangeable behind
//! [`DocumentStore`] and injected as `Arc<dyn DocumentStore>`.

mod blob;
mod memory;
mod redis_backend;
mod sqlite;

pub use blob::*;
pub use memory::MemoryStore;
pub use redis_backend::RedisStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Failure reaching or talking to a backing store.
#[derive(Debug)]
pub struct StoreError {
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> StoreError {
        StoreError {
            source: Box::new(err),
        }
    }

    pub fn msg(message: impl Into<String>) -> StoreError {
        let message: String = message.into();
        StoreError {
            source: message.into(),
        }
    }
}

/// Key-value contract consumed by every repository and counter.
///
/// Values are opaque JSON documents. Counter keys hold plain JSON integers so that
/// `incr`/`decr` work on them directly.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a value; `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    /// Overwrite a value, clearing any TTL.
    async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError>;
    /// Overwrite a value that expires after `ttl`.
    async fn set_with_ttl(&self, key: &str, value: &Value, ttl: Duration)
        -> Result<(), StoreError>;
    /// Remove a key (value or set). Removing an absent key is not an error.
    async fn del(&self, key: &str) -> Result<(), StoreError>;
    /// Atomically add one to an integer key (absent counts as 0) and return the result.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;
    /// Atomically subtract one from an integer key and return the result.
    async fn decr(&self, key: &str) -> Result<i64, StoreError>;
    async fn sadd(&self, key: &str, member: &str) -> Result<(), StoreError>;
    async fn srem(&self, key: &str, member: &str) -> Result<(), StoreError>;
    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError>;
    /// All live keys matching a glob pattern (`*`, `?`).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;
    /// Liveness check.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Open the store named by `url`: `memory`, `sqlite:<path>` or `redis://...`.
pub async fn connect(url: &str) -> Result<Arc<dyn DocumentStore>, StoreError> {
    if url == "memory" {
        return Ok(Arc::new(MemoryStore::new()));
    }
    if let Some(path) = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
    {
        let store = SqliteStore::open(std::path::Path::new(path)).await?;
        return Ok(Arc::new(store));
    }
    if url.starts_with("redis://") || url.starts_with("rediss://") {
        let store = RedisStore::connect(url).await?;
        return Ok(Arc::new(store));
    }
    Err(StoreError::msg(format!("Unsupported store URL: {}", url)))
}

#[cfg(test)]
pub mod testing {
    //! Failure-injecting stores for exercising fallback paths.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// A store whose every call fails.
    pub struct FailingStore;

    fn down<T>() -> Result<T, StoreError> {
        Err(StoreError::msg("store is down"))
    }

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            down()
        }
        async fn set(&self, _key: &str, _value: &Value) -> Result<(), StoreError> {
            down()
        }
        async fn set_with_ttl(&self, _: &str, _: &Value, _: Duration) -> Result<(), StoreError> {
            down()
        }
        async fn del(&self, _key: &str) -> Result<(), StoreError> {
            down()
        }
        async fn incr(&self, _key: &str) -> Result<i64, StoreError> {
            down()
        }
        async fn decr(&self, _key: &str) -> Result<i64, StoreError> {
            down()
        }
        async fn sadd(&self, _key: &str, _member: &str) -> Result<(), StoreError> {
            down()
        }
        async fn srem(&self, _key: &str, _member: &str) -> Result<(), StoreError> {
            down()
        }
        async fn sismember(&self, _key: &str, _member: &str) -> Result<bool, StoreError> {
            down()
        }
        async fn keys(&self, _pattern: &str) -> Result<Vec<String>, StoreError> {
            down()
        }
        async fn ping(&self) -> Result<(), StoreError> {
            down()
        }
    }

    /// Wraps a [`MemoryStore`] and fails every other `incr`.
    pub struct FlakyIncrStore {
        pub inner: MemoryStore,
        calls: AtomicUsize,
    }

    impl FlakyIncrStore {
        pub fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for FlakyIncrStore {
        async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
            self.inner.get(key).await
        }
        async fn set(&self, key: &str, value: &Value) -> Result<(), StoreError> {
            self.inner.set(key, value).await
        }
        async fn set_with_ttl(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), StoreError> {
            self.inner.set_with_ttl(key, value, ttl).await
        }
        async fn del(&self, key: &str) -> Result<(), StoreError> {
            self.inner.del(key).await
        }
        async fn incr(&self, key: &str) -> Result<i64, StoreError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
                return down();
            }
            self.inner.incr(key).await
        }
        async fn decr(&self, key: &str) -> Result<i64, StoreError> {
            self.inner.decr(key).await
        }
        async fn sadd(&self, key: &str, member: &str) -> Result<(), StoreError> {
            self.inner.sadd(key, member).await
        }
        async fn srem(&self, key: &str, member: &str) -> Result<(), StoreError> {
            self.inner.srem(key, member).await
        }
        async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
            self.inner.sismember(key, member).await
        }
        async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
            self.inner.keys(pattern).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }
    }

    /// Wraps a [`MemoryStore`] whose `set` fails, so whole-document writes are lost.
    pub struct ReadOnlyStore {
        pub inner: MemoryStore,
    }

    #[async_trait]
    impl DocumentStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
            self.inner.get(key).await
        }
        async fn set(&self, _key: &str, _value: &Value) -> Result<(), StoreError> {
            down()
        }
        async fn set_with_ttl(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), StoreError> {
            self.inner.set_with_ttl(key, value, ttl).await
        }
        async fn del(&self, key: &str) -> Result<(), StoreError> {
            self.inner.del(key).await
        }
        async fn incr(&self, key: &str) -> Result<i64, StoreError> {
            self.inner.incr(key).await
        }
        async fn decr(&self, key: &str) -> Result<i64, StoreError> {
            self.inner.decr(key).await
        }
        async fn sadd(&self, key: &str, member: &str) -> Result<(), StoreError> {
            self.inner.sadd(key, member).await
        }
        async fn srem(&self, key: &str, member: &str) -> Result<(), StoreError> {
            self.inner.srem(key, member).await
        }
        async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
            self.inner.sismember(key, member).await
        }
        async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
            self.inner.keys(pattern).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            self.inner.ping().await
        }
    }
}
