//! Team member API endpoints.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{success, ApiResult, FormInput, JsonBody};
use crate::errors::AppError;
use crate::models::{Chapter, MoveRequest, Person, PersonInput, ReorderRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PeopleQuery {
    pub chapter: Option<String>,
}

/// GET /api/people?chapter= - One chapter sorted by order, or everyone.
pub async fn list_people(
    State(state): State<AppState>,
    Query(query): Query<PeopleQuery>,
) -> ApiResult<Vec<Person>> {
    match query.chapter.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        None => success(state.repo.people.list_all().await),
        Some(name) => {
            let chapter = Chapter::parse(name)
                .ok_or_else(|| AppError::validation("chapter", "Chapter is not recognised"))?;
            success(state.repo.people.list_by_chapter(chapter).await)
        }
    }
}

/// GET /api/admin/people - Everyone in stored order.
pub async fn list_all_people(State(state): State<AppState>) -> ApiResult<Vec<Person>> {
    success(state.repo.people.list_all().await)
}

/// POST /api/admin/people - Add a person.
pub async fn create_person(
    State(state): State<AppState>,
    form: FormInput<PersonInput>,
) -> ApiResult<Person> {
    success(state.repo.people.add(form.input, form.image).await?)
}

/// PUT /api/admin/people/:id - Replace a person.
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormInput<PersonInput>,
) -> ApiResult<Person> {
    success(state.repo.people.update(&id, form.input, form.image).await?)
}

/// DELETE /api/admin/people/:id - Delete a person.
pub async fn delete_person(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.people.delete(&id).await?;
    success(())
}

/// PUT /api/admin/people/reorder - Apply explicit order values.
pub async fn reorder_people(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ReorderRequest>,
) -> ApiResult<Vec<Person>> {
    if request.items.is_empty() {
        return Err(AppError::BadRequest("No order updates provided".to_string()));
    }
    success(state.repo.people.reorder(&request.items).await?)
}

/// POST /api/admin/people/:id/move - Swap with the chapter neighbour.
pub async fn move_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<MoveRequest>,
) -> ApiResult<Vec<Person>> {
    success(state.repo.people.move_person(&id, request.direction).await?)
}
