//! Review repository.

use std::sync::Arc;

use chrono::Utc;

use super::{keys, position_of, Collection};
use crate::errors::AppError;
use crate::models::{Review, ReviewInput};
use crate::store::DocumentStore;
use crate::validation::Schema;

pub struct ReviewRepository {
    collection: Collection<Review>,
}

impl ReviewRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            collection: Collection::new(store, keys::REVIEWS),
        }
    }

    /// All reviews in stored order. Never fails.
    pub async fn list_all(&self) -> Vec<Review> {
        self.collection.list_all().await
    }

    pub async fn initialize_defaults(&self, defaults: &[Review]) -> Result<bool, AppError> {
        self.collection.initialize_defaults(defaults).await
    }

    /// Validate and append a new review.
    pub async fn add(&self, mut input: ReviewInput) -> Result<Review, AppError> {
        input.normalize();
        input.check()?;

        let mut reviews = self.collection.load().await?;
        let review = build_review(uuid::Uuid::new_v4().to_string(), input);
        reviews.push(review.clone());
        self.collection.save(&reviews).await?;

        tracing::info!("Added review {} from {}", review.id, review.name);
        Ok(review)
    }

    /// Replace the review with `id` wholesale.
    pub async fn update(&self, id: &str, mut input: ReviewInput) -> Result<Review, AppError> {
        input.normalize();
        input.check()?;

        let mut reviews = self.collection.load().await?;
        let index = position_of(&reviews, id, "Review")?;
        let review = build_review(id.to_string(), input);
        reviews[index] = review.clone();
        self.collection.save(&reviews).await?;

        tracing::info!("Updated review {}", id);
        Ok(review)
    }

    /// Delete by id; deleting an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.collection.remove(id).await? {
            tracing::info!("Deleted review {}", id);
        }
        Ok(())
    }
}

fn build_review(id: String, input: ReviewInput) -> Review {
    Review {
        id,
        name: input.name,
        role: input.role,
        school: input.school,
        content: input.content,
        rating: input.rating,
        date: input
            .date
            .unwrap_or_else(|| Utc::now().format("%B %Y").to_string()),
        source: input.source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::FailingStore;
    use crate::store::MemoryStore;

    fn input(name: &str, rating: i64) -> ReviewInput {
        ReviewInput {
            name: name.to_string(),
            school: "Lincoln Elementary".to_string(),
            content: "The kids loved the robotics demo.".to_string(),
            rating,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_update_delete() {
        let repo = ReviewRepository::new(Arc::new(MemoryStore::new()));

        let added = repo.add(input("  Ms. Rivera ", 5)).await.unwrap();
        assert_eq!(added.name, "Ms. Rivera");
        assert!(!added.date.is_empty());
        assert!(!added.id.is_empty());

        let mut changed = input("Ms. Rivera", 4);
        changed.date = Some("May 2024".to_string());
        let updated = repo.update(&added.id, changed).await.unwrap();
        assert_eq!(updated.id, added.id);
        assert_eq!(updated.rating, 4);
        assert_eq!(updated.date, "May 2024");
        assert_eq!(repo.list_all().await, vec![updated]);

        repo.delete(&added.id).await.unwrap();
        assert!(repo.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_rating_out_of_range() {
        let repo = ReviewRepository::new(Arc::new(MemoryStore::new()));

        for rating in [0, 6] {
            match repo.add(input("A", rating)).await {
                Err(AppError::Validation(e)) => assert_eq!(e.field, "rating"),
                other => panic!("expected rating validation error, got {:?}", other),
            }
        }
        assert!(repo.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_first_missing_field_is_reported() {
        let repo = ReviewRepository::new(Arc::new(MemoryStore::new()));

        let err = repo.add(ReviewInput::default()).await.unwrap_err();
        match err {
            AppError::Validation(e) => {
                assert_eq!(e.field, "name");
                assert_eq!(e.message, "Name is required");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let repo = ReviewRepository::new(Arc::new(MemoryStore::new()));
        let err = repo.update("missing", input("A", 3)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_ok() {
        let repo = ReviewRepository::new(Arc::new(MemoryStore::new()));
        repo.delete("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_store_down() {
        let repo = ReviewRepository::new(Arc::new(FailingStore));

        assert!(repo.list_all().await.is_empty());
        let err = repo.add(input("A", 3)).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
