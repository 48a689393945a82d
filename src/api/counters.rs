//! Like and view counter endpoints.
//!
//! These address articles by id and are independent of the `views` field embedded in
//! each article record.

use std::collections::{BTreeMap, HashMap};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult, JsonBody};
use crate::db::LikeState;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LikeCountsQuery {
    /// Comma separated article ids
    #[serde(default)]
    pub ids: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikeStatus {
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToggleLikeRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct Views {
    pub views: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetViewsRequest {
    pub views: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitializeViewsRequest {
    pub initial: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitializeLikesRequest {
    pub counts: HashMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct InitializedIds {
    pub initialized: Vec<String>,
}

/// GET /api/counters/likes?ids=a,b - Batched like counts.
pub async fn get_like_counts(
    State(state): State<AppState>,
    Query(query): Query<LikeCountsQuery>,
) -> ApiResult<BTreeMap<String, i64>> {
    let ids: Vec<String> = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    success(state.repo.likes.get_like_counts(&ids).await)
}

/// GET /api/counters/:id/likes?userId= - Count, plus the user's state when given.
pub async fn get_likes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LikeQuery>,
) -> ApiResult<LikeStatus> {
    let count = state.repo.likes.get_like_count(&id).await;
    let liked = match query.user_id.as_deref().filter(|u| !u.is_empty()) {
        Some(user_id) => Some(state.repo.likes.has_liked(&id, user_id).await),
        None => None,
    };
    success(LikeStatus { count, liked })
}

/// POST /api/counters/:id/likes - Toggle the user's like.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<ToggleLikeRequest>,
) -> ApiResult<LikeState> {
    success(state.repo.likes.toggle_like(&id, &request.user_id).await?)
}

/// GET /api/counters/:id/views
pub async fn get_views(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Views> {
    success(Views {
        views: state.repo.views.get_views(&id).await,
    })
}

/// POST /api/counters/:id/views - Count one view.
pub async fn increment_views(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Views> {
    success(Views {
        views: state.repo.views.increment_views(&id).await,
    })
}

/// GET /api/admin/views - Every view counter.
pub async fn list_views(State(state): State<AppState>) -> ApiResult<BTreeMap<String, i64>> {
    success(state.repo.views.get_all_views().await)
}

/// PUT /api/admin/views/:id - Overwrite a view counter.
pub async fn set_views(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<SetViewsRequest>,
) -> ApiResult<Views> {
    state.repo.views.set_views(&id, request.views).await?;
    success(Views {
        views: request.views,
    })
}

/// DELETE /api/admin/views/:id - Reset a view counter to zero.
pub async fn reset_views(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Views> {
    state.repo.views.reset_views(&id).await?;
    success(Views { views: 0 })
}

/// POST /api/admin/views/:id/initialize - Seed a counter if it has none.
pub async fn initialize_views(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Views> {
    // The body is optional; an empty one seeds zero.
    let initial = if body.is_empty() {
        0
    } else {
        serde_json::from_slice::<InitializeViewsRequest>(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))?
            .initial
    };
    success(Views {
        views: state.repo.views.initialize_views(&id, initial).await?,
    })
}

/// POST /api/admin/likes/initialize - Seed like counts per article.
pub async fn initialize_likes(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<InitializeLikesRequest>,
) -> ApiResult<InitializedIds> {
    if request.counts.is_empty() {
        return Err(AppError::BadRequest("No like counts provided".to_string()));
    }
    success(InitializedIds {
        initialized: state.repo.likes.initialize_like_counts(&request.counts).await?,
    })
}
