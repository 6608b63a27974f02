//! Author handlers.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::api_keys::ApiPrincipal;
use crate::application::authors::{CreateAuthorCommand, UpdateAuthorCommand};
use crate::application::pagination::PageRequest;
use crate::domain::scopes::ApiScope;

use super::author_to_api;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{AuthorCreateRequest, AuthorUpdateRequest, ListQuery};
use crate::infra::http::state::ApiState;

pub async fn list_authors(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::AuthorRead)
        .map_err(|_| ApiError::forbidden())?;

    let page = PageRequest::from_query(query.page, query.limit);
    let payload = state.authors.list(page).await.map_err(author_to_api)?;

    // Pre-serialized cache payload; bypass Json to avoid re-encoding.
    Ok(([(header::CONTENT_TYPE, "application/json")], payload))
}

pub async fn get_author(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::AuthorRead)
        .map_err(|_| ApiError::forbidden())?;
    let can_write = principal.has(ApiScope::AuthorWrite);

    let detail = state
        .authors
        .detail(id, can_write)
        .await
        .map_err(author_to_api)?;

    Ok(Json(detail))
}

pub async fn create_author(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Json(payload): Json<AuthorCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::AuthorWrite)
        .map_err(|_| ApiError::forbidden())?;

    let command = CreateAuthorCommand {
        lastname: payload.lastname,
        firstname: payload.firstname,
    };

    let created = state
        .authors
        .create(command, true)
        .await
        .map_err(author_to_api)?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, created.location)],
        Json(created.detail),
    ))
}

pub async fn update_author(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AuthorUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::AuthorWrite)
        .map_err(|_| ApiError::forbidden())?;

    let command = UpdateAuthorCommand {
        lastname: payload.lastname,
        firstname: payload.firstname,
    };

    state
        .authors
        .update(id, command)
        .await
        .map_err(author_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_author(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::AuthorWrite)
        .map_err(|_| ApiError::forbidden())?;

    state.authors.delete(id).await.map_err(author_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}
