//! Per-article view counters (`article:<id>:views`).
//!
//! Independent of the `views` field embedded in each [`NewsArticle`]; public article
//! pages read and bump the embedded field, this counter backs the counters API.
//!
//! [`NewsArticle`]: crate::models::NewsArticle

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::keys;
use crate::errors::AppError;
use crate::store::DocumentStore;

pub struct ViewCounter {
    store: Arc<dyn DocumentStore>,
}

impl ViewCounter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Current count; 0 when absent or unreachable.
    pub async fn get_views(&self, id: &str) -> i64 {
        match self.store.get(&keys::article_views(id)).await {
            Ok(value) => count_of(value.as_ref()),
            Err(e) => {
                tracing::warn!("Reading views for {} failed, reporting 0: {}", id, e);
                0
            }
        }
    }

    /// Atomically add one view. If the store rejects the increment, the result is
    /// approximated as the last readable count plus one.
    pub async fn increment_views(&self, id: &str) -> i64 {
        match self.store.incr(&keys::article_views(id)).await {
            Ok(views) => views,
            Err(e) => {
                tracing::warn!("Incrementing views for {} failed, approximating: {}", id, e);
                self.get_views(id).await.saturating_add(1)
            }
        }
    }

    /// Seed the counter only if it does not exist yet; returns the resulting value.
    pub async fn initialize_views(&self, id: &str, initial: i64) -> Result<i64, AppError> {
        ensure_non_negative(initial)?;
        let key = keys::article_views(id);
        if let Some(existing) = self.store.get(&key).await? {
            return Ok(count_of(Some(&existing)));
        }
        self.store.set(&key, &Value::from(initial)).await?;
        Ok(initial)
    }

    pub async fn reset_views(&self, id: &str) -> Result<(), AppError> {
        self.set_views(id, 0).await
    }

    pub async fn set_views(&self, id: &str, views: i64) -> Result<(), AppError> {
        ensure_non_negative(views)?;
        self.store
            .set(&keys::article_views(id), &Value::from(views))
            .await?;
        tracing::info!("Set views for {} to {}", id, views);
        Ok(())
    }

    /// Every view counter by article id. Scans the key space; fine for a small site.
    pub async fn get_all_views(&self) -> BTreeMap<String, i64> {
        let found = match self.store.keys(&keys::article_views("*")).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Listing view counters failed: {}", e);
                return BTreeMap::new();
            }
        };

        let mut all = BTreeMap::new();
        for key in found {
            let Some(id) = key
                .strip_prefix("article:")
                .and_then(|rest| rest.strip_suffix(":views"))
            else {
                continue;
            };
            all.insert(id.to_string(), self.get_views(id).await);
        }
        all
    }
}

/// Stored counters are JSON integers; anything else reads as 0.
pub(crate) fn count_of(value: Option<&Value>) -> i64 {
    value.and_then(Value::as_i64).unwrap_or(0).max(0)
}

fn ensure_non_negative(n: i64) -> Result<(), AppError> {
    if n < 0 {
        return Err(AppError::validation(
            "views",
            "Views must be a non-negative whole number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{FailingStore, FlakyIncrStore};
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_increment_from_absent() {
        let views = ViewCounter::new(Arc::new(MemoryStore::new()));
        assert_eq!(views.get_views("a").await, 0);
        assert_eq!(views.increment_views("a").await, 1);
        assert_eq!(views.increment_views("a").await, 2);
        assert_eq!(views.get_views("a").await, 2);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let views = ViewCounter::new(Arc::new(MemoryStore::new()));
        assert_eq!(views.initialize_views("a", 10).await.unwrap(), 10);
        assert_eq!(views.initialize_views("a", 50).await.unwrap(), 10);
        views.increment_views("a").await;
        assert_eq!(views.initialize_views("a", 0).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_set_reset_and_list() {
        let views = ViewCounter::new(Arc::new(MemoryStore::new()));
        views.set_views("a", 7).await.unwrap();
        views.increment_views("b").await;
        assert!(views.set_views("a", -1).await.is_err());

        let all = views.get_all_views().await;
        assert_eq!(all.get("a"), Some(&7));
        assert_eq!(all.get("b"), Some(&1));

        views.reset_views("a").await.unwrap();
        assert_eq!(views.get_views("a").await, 0);
    }

    #[tokio::test]
    async fn test_store_down_reads_zero() {
        let views = ViewCounter::new(Arc::new(FailingStore));
        assert_eq!(views.get_views("a").await, 0);
        assert_eq!(views.increment_views("a").await, 1);
        assert!(views.get_all_views().await.is_empty());
    }

    #[tokio::test]
    async fn test_increments_never_decrease_under_failures() {
        let views = ViewCounter::new(Arc::new(FlakyIncrStore::new()));

        let mut last = 0;
        for _ in 0..10 {
            let now = views.increment_views("a").await;
            assert!(now >= last, "count went from {} to {}", last, now);
            last = now;
        }
        assert!(last >= 5);
    }
}
