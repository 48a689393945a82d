//! Homepage and per-chapter statistics singletons.

use std::sync::Arc;

use super::{defaults, keys, Singleton};
use crate::errors::AppError;
use crate::models::{Chapter, Stats, StatsInput};
use crate::store::DocumentStore;

pub struct StatsRepository {
    store: Arc<dyn DocumentStore>,
    homepage: Singleton<Stats>,
}

impl StatsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            homepage: Singleton::new(store.clone(), keys::HOMEPAGE_STATS),
            store,
        }
    }

    fn chapter(&self, chapter: Chapter) -> Singleton<Stats> {
        Singleton::new(self.store.clone(), chapter.stats_key())
    }

    /// Homepage stats; the preset figures when unset or unreachable.
    pub async fn homepage_stats(&self) -> Stats {
        self.homepage.get_or(defaults::homepage_stats()).await
    }

    pub async fn chapter_stats(&self, chapter: Chapter) -> Stats {
        self.chapter(chapter)
            .get_or(defaults::chapter_stats(chapter))
            .await
    }

    pub async fn update_homepage_stats(&self, input: StatsInput) -> Result<Stats, AppError> {
        let stats = input.into_stats()?;
        self.homepage.set(&stats).await?;
        tracing::info!("Updated homepage stats: {:?}", stats);
        Ok(stats)
    }

    pub async fn update_chapter_stats(
        &self,
        chapter: Chapter,
        input: StatsInput,
    ) -> Result<Stats, AppError> {
        let stats = input.into_stats()?;
        self.chapter(chapter).set(&stats).await?;
        tracing::info!("Updated {} stats: {:?}", chapter.as_str(), stats);
        Ok(stats)
    }

    pub async fn initialize_homepage(&self, default: &Stats) -> Result<bool, AppError> {
        self.homepage.initialize(default).await
    }

    pub async fn initialize_chapter(
        &self,
        chapter: Chapter,
        default: &Stats,
    ) -> Result<bool, AppError> {
        self.chapter(chapter).initialize(default).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::FailingStore;
    use crate::store::MemoryStore;

    fn input(schools: i64, classes: i64, students: i64) -> StatsInput {
        StatsInput {
            schools_visited: Some(schools),
            classes_taught: Some(classes),
            students_inspired: Some(students),
        }
    }

    #[tokio::test]
    async fn test_chapter_stats_are_independent() {
        let repo = StatsRepository::new(Arc::new(MemoryStore::new()));
        let stats = repo
            .update_chapter_stats(Chapter::California, input(4, 12, 300))
            .await
            .unwrap();
        assert_eq!(stats.students_inspired, 300);

        assert_eq!(repo.chapter_stats(Chapter::California).await, stats);
        assert_eq!(
            repo.chapter_stats(Chapter::Calgary).await,
            defaults::chapter_stats(Chapter::Calgary)
        );
        assert_eq!(repo.homepage_stats().await, defaults::homepage_stats());
    }

    #[tokio::test]
    async fn test_negative_numbers_rejected() {
        let repo = StatsRepository::new(Arc::new(MemoryStore::new()));
        let err = repo
            .update_homepage_stats(input(1, -2, 3))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("classesTaught"));
    }

    #[tokio::test]
    async fn test_partial_update_leaves_stored_stats() {
        let repo = StatsRepository::new(Arc::new(MemoryStore::new()));
        let stored = repo.update_homepage_stats(input(10, 20, 30)).await.unwrap();

        let partial = StatsInput {
            schools_visited: Some(11),
            ..StatsInput::default()
        };
        let err = repo.update_homepage_stats(partial).await.unwrap_err();
        assert_eq!(err.field(), Some("classesTaught"));
        assert_eq!(repo.homepage_stats().await, stored);
    }

    #[tokio::test]
    async fn test_store_down_returns_presets() {
        let repo = StatsRepository::new(Arc::new(FailingStore));
        assert_eq!(repo.homepage_stats().await, defaults::homepage_stats());
        assert!(repo
            .update_homepage_stats(input(0, 0, 0))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_initialize_does_not_overwrite() {
        let repo = StatsRepository::new(Arc::new(MemoryStore::new()));
        let edited = repo.update_homepage_stats(input(99, 99, 99)).await.unwrap();

        assert!(!repo
            .initialize_homepage(&defaults::homepage_stats())
            .await
            .unwrap());
        assert_eq!(repo.homepage_stats().await, edited);
    }
}
