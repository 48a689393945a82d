//! Content repositories over the document store.
//!
//! The document store is the source of truth for all site content. Every operation
//! re-reads the backing key; nothing is cached in process.

mod articles;
mod collection;
pub mod defaults;
mod likes;
mod people;
mod reviews;
mod stats;
mod views;

pub use articles::*;
pub use collection::*;
pub use likes::*;
pub use people::*;
pub use reviews::*;
pub use stats::*;
pub use views::*;

use std::sync::Arc;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::Chapter;
use crate::store::DocumentStore;
use crate::upload::ImageUploader;

/// Persisted key layout.
pub mod keys {
    pub const REVIEWS: &str = "reviews";
    pub const NEWS_ARTICLES: &str = "news_articles";
    pub const PEOPLE: &str = "people";
    pub const HOMEPAGE_STATS: &str = "homepage_stats";

    pub fn article_views(id: &str) -> String {
        format!("article:{}:views", id)
    }

    pub fn article_likes(id: &str) -> String {
        format!("article:{}:likes", id)
    }

    pub fn article_liked_by(id: &str) -> String {
        format!("article:{}:likedBy", id)
    }

    pub fn admin_session(token: &str) -> String {
        format!("admin_session:{}", token)
    }
}

/// All content repositories, sharing one store.
#[derive(Clone)]
pub struct Repository {
    pub reviews: Arc<ReviewRepository>,
    pub articles: Arc<ArticleRepository>,
    pub people: Arc<PeopleRepository>,
    pub stats: Arc<StatsRepository>,
    pub views: Arc<ViewCounter>,
    pub likes: Arc<LikeCounter>,
}

/// Which documents a seeding pass actually wrote.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub reviews: bool,
    pub articles: bool,
    pub people: bool,
    pub homepage_stats: bool,
    pub chapter_stats: Vec<String>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>, uploader: Arc<ImageUploader>) -> Self {
        Self {
            reviews: Arc::new(ReviewRepository::new(store.clone())),
            articles: Arc::new(ArticleRepository::new(store.clone(), uploader.clone())),
            people: Arc::new(PeopleRepository::new(store.clone(), uploader)),
            stats: Arc::new(StatsRepository::new(store.clone())),
            views: Arc::new(ViewCounter::new(store.clone())),
            likes: Arc::new(LikeCounter::new(store)),
        }
    }

    /// Seed every collection and stats singleton that is still empty. Safe to call
    /// on every admin panel load.
    pub async fn initialize_defaults(&self) -> Result<SeedReport, AppError> {
        let mut report = SeedReport {
            reviews: self
                .reviews
                .initialize_defaults(&defaults::reviews())
                .await?,
            articles: self
                .articles
                .initialize_defaults(&defaults::articles())
                .await?,
            people: self
                .people
                .initialize_defaults(&defaults::people())
                .await?,
            homepage_stats: self
                .stats
                .initialize_homepage(&defaults::homepage_stats())
                .await?,
            chapter_stats: Vec::new(),
        };

        for chapter in Chapter::ALL {
            if self
                .stats
                .initialize_chapter(chapter, &defaults::chapter_stats(chapter))
                .await?
            {
                report.chapter_stats.push(chapter.as_str().to_string());
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LocalBlobStore, MemoryStore};

    fn repository(store: Arc<dyn DocumentStore>) -> Repository {
        let blobs = Arc::new(LocalBlobStore::new(std::env::temp_dir(), "/media"));
        Repository::new(store, Arc::new(ImageUploader::new(blobs, 1024)))
    }

    #[tokio::test]
    async fn test_initialize_defaults_is_idempotent() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let repo = repository(store.clone());

        let first = repo.initialize_defaults().await.unwrap();
        assert!(first.reviews && first.articles && first.people && first.homepage_stats);
        assert_eq!(first.chapter_stats.len(), Chapter::ALL.len());
        let seeded = store.get(keys::REVIEWS).await.unwrap();

        let second = repo.initialize_defaults().await.unwrap();
        assert_eq!(second, SeedReport::default());
        assert_eq!(store.get(keys::REVIEWS).await.unwrap(), seeded);
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(keys::article_views("42"), "article:42:views");
        assert_eq!(keys::article_likes("42"), "article:42:likes");
        assert_eq!(keys::article_liked_by("42"), "article:42:likedBy");
        assert_eq!(keys::admin_session("tok"), "admin_session:tok");
    }
}
