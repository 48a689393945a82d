//! News article API endpoints.

use axum::extract::{Path, State};
use serde::Serialize;

use super::{success, ApiResult, FormInput};
use crate::errors::AppError;
use crate::models::{ArticleInput, NewsArticle};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ViewCount {
    pub views: i64,
}

/// GET /api/articles - Published articles.
pub async fn list_published_articles(State(state): State<AppState>) -> ApiResult<Vec<NewsArticle>> {
    success(state.repo.articles.list_published().await)
}

/// GET /api/articles/:slug - One published article.
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<NewsArticle> {
    match state.repo.articles.get_by_slug(&slug).await {
        Some(article) => success(article),
        None => Err(AppError::NotFound(format!("Article {} not found", slug))),
    }
}

/// POST /api/articles/:slug/view - Count a page view on the article itself.
pub async fn record_article_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<ViewCount> {
    let views = state.repo.articles.increment_views_by_slug(&slug).await?;
    success(ViewCount { views })
}

/// GET /api/admin/articles - All articles including drafts.
pub async fn list_all_articles(State(state): State<AppState>) -> ApiResult<Vec<NewsArticle>> {
    success(state.repo.articles.list_all().await)
}

/// POST /api/admin/articles - Add an article.
pub async fn create_article(
    State(state): State<AppState>,
    form: FormInput<ArticleInput>,
) -> ApiResult<NewsArticle> {
    success(state.repo.articles.add(form.input, form.image).await?)
}

/// PUT /api/admin/articles/:id - Replace an article.
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormInput<ArticleInput>,
) -> ApiResult<NewsArticle> {
    success(state.repo.articles.update(&id, form.input, form.image).await?)
}

/// DELETE /api/admin/articles/:id - Delete an article.
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.articles.delete(&id).await?;
    success(())
}
