//! News article repository.

use std::sync::Arc;

use chrono::Utc;

use super::{keys, position_of, Collection};
use crate::errors::AppError;
use crate::models::{ArticleInput, NewsArticle, ARTICLE_PLACEHOLDER_IMAGE};
use crate::store::DocumentStore;
use crate::upload::{freshly_uploaded, log_orphaned_upload, ImageFile, ImageUploader};
use crate::validation::{validate_image_ref, Schema};

pub struct ArticleRepository {
    collection: Collection<NewsArticle>,
    uploader: Arc<ImageUploader>,
}

impl ArticleRepository {
    pub fn new(store: Arc<dyn DocumentStore>, uploader: Arc<ImageUploader>) -> Self {
        Self {
            collection: Collection::new(store, keys::NEWS_ARTICLES),
            uploader,
        }
    }

    /// Every article, published or not. Never fails.
    pub async fn list_all(&self) -> Vec<NewsArticle> {
        self.collection.list_all().await
    }

    /// Published articles in stored order. Never fails.
    pub async fn list_published(&self) -> Vec<NewsArticle> {
        self.list_all()
            .await
            .into_iter()
            .filter(|a| a.published)
            .collect()
    }

    /// A published article by slug. Unpublished articles are treated as absent.
    pub async fn get_by_slug(&self, slug: &str) -> Option<NewsArticle> {
        self.list_all()
            .await
            .into_iter()
            .find(|a| a.slug == slug && a.published)
    }

    /// Bump the embedded `views` field of a published article; returns the new count.
    pub async fn increment_views_by_slug(&self, slug: &str) -> Result<i64, AppError> {
        let mut articles = self.collection.load().await?;
        let article = articles
            .iter_mut()
            .find(|a| a.slug == slug && a.published)
            .ok_or_else(|| AppError::NotFound(format!("Article {} not found", slug)))?;
        article.views = article.views.saturating_add(1);
        let views = article.views;
        self.collection.save(&articles).await?;
        Ok(views)
    }

    pub async fn initialize_defaults(&self, defaults: &[NewsArticle]) -> Result<bool, AppError> {
        self.collection.initialize_defaults(defaults).await
    }

    /// Validate and append a new article. Views and comments start at zero unless given.
    pub async fn add(
        &self,
        mut input: ArticleInput,
        image_file: Option<ImageFile>,
    ) -> Result<NewsArticle, AppError> {
        input.normalize();
        input.check()?;
        if let Some(image) = &input.image {
            validate_image_ref("image", image)?;
        }

        let mut articles = self.collection.load().await?;
        ensure_unique_slug(&articles, &input.slug, None)?;

        let image = self
            .uploader
            .resolve(image_file.as_ref(), input.image.as_deref())
            .await?
            .unwrap_or_else(|| ARTICLE_PLACEHOLDER_IMAGE.to_string());
        let uploaded = freshly_uploaded(image_file.as_ref(), &image, input.image.as_deref());

        let article = NewsArticle {
            id: uuid::Uuid::new_v4().to_string(),
            date: input.date.clone().unwrap_or_else(today),
            views: input.views.unwrap_or(0),
            comments: input.comments.unwrap_or(0),
            image,
            title: input.title,
            slug: input.slug,
            excerpt: input.excerpt,
            content: input.content,
            author: input.author,
            read_time: input.read_time,
            published: input.published,
        };
        articles.push(article.clone());
        self.collection
            .save(&articles)
            .await
            .inspect_err(|_| log_orphaned_upload(uploaded, &article.image))?;

        tracing::info!("Added article {} ({})", article.slug, article.id);
        Ok(article)
    }

    /// Replace the article with `id`. The slug may only collide with itself.
    pub async fn update(
        &self,
        id: &str,
        mut input: ArticleInput,
        image_file: Option<ImageFile>,
    ) -> Result<NewsArticle, AppError> {
        input.normalize();
        input.check()?;
        if let Some(image) = &input.image {
            validate_image_ref("image", image)?;
        }

        let mut articles = self.collection.load().await?;
        let index = position_of(&articles, id, "Article")?;
        ensure_unique_slug(&articles, &input.slug, Some(id))?;

        let existing = &articles[index];
        let image = self
            .uploader
            .resolve(image_file.as_ref(), input.image.as_deref())
            .await?
            .unwrap_or_else(|| existing.image.clone());
        let uploaded = freshly_uploaded(image_file.as_ref(), &image, input.image.as_deref());

        let article = NewsArticle {
            id: id.to_string(),
            date: input.date.clone().unwrap_or_else(|| existing.date.clone()),
            views: input.views.unwrap_or(existing.views),
            comments: input.comments.unwrap_or(existing.comments),
            image,
            title: input.title,
            slug: input.slug,
            excerpt: input.excerpt,
            content: input.content,
            author: input.author,
            read_time: input.read_time,
            published: input.published,
        };
        articles[index] = article.clone();
        self.collection
            .save(&articles)
            .await
            .inspect_err(|_| log_orphaned_upload(uploaded, &article.image))?;

        tracing::info!("Updated article {} ({})", article.slug, id);
        Ok(article)
    }

    /// Delete by id; deleting an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.collection.remove(id).await? {
            tracing::info!("Deleted article {}", id);
        }
        Ok(())
    }
}

fn today() -> String {
    Utc::now().format("%B %-d, %Y").to_string()
}

fn ensure_unique_slug(
    articles: &[NewsArticle],
    slug: &str,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    let taken = articles
        .iter()
        .any(|a| a.slug == slug && Some(a.id.as_str()) != exclude_id);
    if taken {
        return Err(AppError::validation(
            "slug",
            format!("An article with slug \"{}\" already exists", slug),
        ));
    }
    Ok(())
}
