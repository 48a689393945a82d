//! Review API endpoints.

use axum::extract::{Path, State};

use super::{success, ApiResult, FormInput};
use crate::models::{Review, ReviewInput};
use crate::AppState;

/// GET /api/reviews and /api/admin/reviews - List all reviews.
pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Vec<Review>> {
    success(state.repo.reviews.list_all().await)
}

/// POST /api/admin/reviews - Add a review.
pub async fn create_review(
    State(state): State<AppState>,
    form: FormInput<ReviewInput>,
) -> ApiResult<Review> {
    success(state.repo.reviews.add(form.input).await?)
}

/// PUT /api/admin/reviews/:id - Replace a review.
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormInput<ReviewInput>,
) -> ApiResult<Review> {
    success(state.repo.reviews.update(&id, form.input).await?)
}

/// DELETE /api/admin/reviews/:id - Delete a review.
pub async fn delete_review(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.reviews.delete(&id).await?;
    success(())
}
