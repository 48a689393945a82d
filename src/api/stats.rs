//! Statistics API endpoints.

use axum::extract::{Path, State};

use super::{success, ApiResult, FormInput};
use crate::errors::AppError;
use crate::models::{Chapter, Stats, StatsInput};
use crate::AppState;

fn chapter_from_path(name: &str) -> Result<Chapter, AppError> {
    Chapter::parse(name).ok_or_else(|| AppError::NotFound(format!("Chapter {} not found", name)))
}

/// GET /api/stats/homepage
pub async fn get_homepage_stats(State(state): State<AppState>) -> ApiResult<Stats> {
    success(state.repo.stats.homepage_stats().await)
}

/// GET /api/stats/chapters/:chapter
pub async fn get_chapter_stats(
    State(state): State<AppState>,
    Path(chapter): Path<String>,
) -> ApiResult<Stats> {
    let chapter = chapter_from_path(&chapter)?;
    success(state.repo.stats.chapter_stats(chapter).await)
}

/// PUT /api/admin/stats/homepage
pub async fn update_homepage_stats(
    State(state): State<AppState>,
    form: FormInput<StatsInput>,
) -> ApiResult<Stats> {
    success(state.repo.stats.update_homepage_stats(form.input).await?)
}

/// PUT /api/admin/stats/chapters/:chapter
pub async fn update_chapter_stats(
    State(state): State<AppState>,
    Path(chapter): Path<String>,
    form: FormInput<StatsInput>,
) -> ApiResult<Stats> {
    let chapter = chapter_from_path(&chapter)?;
    success(state.repo.stats.update_chapter_stats(chapter, form.input).await?)
}
