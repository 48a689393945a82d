//! Per-user article likes.
//!
//! `article:<id>:likedBy` is the set of users who like an article and decides
//! whether a given user has liked it. `article:<id>:likes` is a denormalised count
//! kept equal to the set's size by [`LikeCounter::toggle_like`]. The three store
//! calls in a toggle are not atomic; concurrent toggles by one user can drift the
//! count from the set.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::keys;
use super::views::count_of;
use crate::errors::AppError;
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub count: i64,
}

pub struct LikeCounter {
    store: Arc<dyn DocumentStore>,
}

impl LikeCounter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Whether `user_id` currently likes the article; false if the store is unreachable.
    pub async fn has_liked(&self, article_id: &str, user_id: &str) -> bool {
        self.store
            .sismember(&keys::article_liked_by(article_id), user_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Like lookup for {} failed: {}", article_id, e);
                false
            })
    }

    pub async fn get_like_count(&self, article_id: &str) -> i64 {
        match self.store.get(&keys::article_likes(article_id)).await {
            Ok(value) => count_of(value.as_ref()),
            Err(e) => {
                tracing::warn!("Reading likes for {} failed, reporting 0: {}", article_id, e);
                0
            }
        }
    }

    /// Flip `user_id`'s like on an article and return the resulting state.
    pub async fn toggle_like(&self, article_id: &str, user_id: &str) -> Result<LikeState, AppError> {
        if user_id.trim().is_empty() {
            return Err(AppError::validation("userId", "User id is required"));
        }

        let set_key = keys::article_liked_by(article_id);
        let count_key = keys::article_likes(article_id);

        let liked = if self.store.sismember(&set_key, user_id).await? {
            self.store.srem(&set_key, user_id).await?;
            if self.store.decr(&count_key).await? < 0 {
                self.store.set(&count_key, &Value::from(0)).await?;
            }
            false
        } else {
            self.store.sadd(&set_key, user_id).await?;
            self.store.incr(&count_key).await?;
            true
        };

        let count = count_of(self.store.get(&count_key).await?.as_ref());
        tracing::debug!(article_id, liked, count, "Toggled like");
        Ok(LikeState { liked, count })
    }

    /// Counts for several articles at once; ids without a counter report 0.
    pub async fn get_like_counts(&self, article_ids: &[String]) -> BTreeMap<String, i64> {
        let mut counts = BTreeMap::new();
        for id in article_ids {
            counts.insert(id.clone(), self.get_like_count(id).await);
        }
        counts
    }

    /// Seed each article's count only where that article has none yet. Returns the
    /// ids that were written.
    pub async fn initialize_like_counts(
        &self,
        defaults: &HashMap<String, i64>,
    ) -> Result<Vec<String>, AppError> {
        if let Some((id, _)) = defaults.iter().find(|(_, n)| **n < 0) {
            return Err(AppError::validation(
                "counts",
                format!("Like count for {} must be a non-negative whole number", id),
            ));
        }

        let mut written = Vec::new();
        for (id, &count) in defaults {
            let key = keys::article_likes(id);
            if self.store.get(&key).await?.is_none() {
                self.store.set(&key, &Value::from(count)).await?;
                written.push(id.clone());
            }
        }
        written.sort();
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::FailingStore;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_toggle_is_per_user() {
        let likes = LikeCounter::new(Arc::new(MemoryStore::new()));

        let first = likes.toggle_like("a", "u1").await.unwrap();
        assert_eq!(first, LikeState { liked: true, count: 1 });
        assert!(likes.has_liked("a", "u1").await);

        let second = likes.toggle_like("a", "u2").await.unwrap();
        assert_eq!(second.count, 2);

        let undo = likes.toggle_like("a", "u1").await.unwrap();
        assert_eq!(undo, LikeState { liked: false, count: 1 });
        assert!(!likes.has_liked("a", "u1").await);
        assert_eq!(likes.get_like_count("b").await, 0);
    }

    #[tokio::test]
    async fn test_count_tracks_final_liked_users() {
        let store = Arc::new(MemoryStore::new());
        let likes = LikeCounter::new(store.clone());
        let toggles = ["u1", "u2", "u3", "u1", "u4", "u2", "u1", "u5", "u5"];

        let mut liked = std::collections::HashSet::new();
        for user in toggles {
            if !liked.remove(user) {
                liked.insert(user);
            }
            likes.toggle_like("a", user).await.unwrap();
        }

        assert_eq!(likes.get_like_count("a").await, liked.len() as i64);
        for user in ["u1", "u2", "u3", "u4", "u5"] {
            assert_eq!(likes.has_liked("a", user).await, liked.contains(user));
        }
    }

    #[tokio::test]
    async fn test_initialize_is_per_key() {
        let likes = LikeCounter::new(Arc::new(MemoryStore::new()));
        likes.toggle_like("a", "u1").await.unwrap();

        let seed = HashMap::from([("a".to_string(), 40), ("b".to_string(), 12)]);
        let written = likes.initialize_like_counts(&seed).await.unwrap();
        assert_eq!(written, vec!["b".to_string()]);

        let counts = likes
            .get_like_counts(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await;
        assert_eq!(counts["a"], 1);
        assert_eq!(counts["b"], 12);
        assert_eq!(counts["c"], 0);
    }

    #[tokio::test]
    async fn test_blank_user_rejected() {
        let likes = LikeCounter::new(Arc::new(MemoryStore::new()));
        let err = likes.toggle_like("a", "  ").await.unwrap_err();
        assert_eq!(err.field(), Some("userId"));
    }

    #[tokio::test]
    async fn test_store_down() {
        let likes = LikeCounter::new(Arc::new(FailingStore));
        assert_eq!(likes.get_like_count("a").await, 0);
        assert!(!likes.has_liked("a", "u1").await);
        assert!(matches!(
            likes.toggle_like("a", "u1").await,
            Err(AppError::StoreUnavailable(_))
        ));
    }
}
