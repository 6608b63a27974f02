//! Book handlers.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::api_keys::ApiPrincipal;
use crate::application::books::{CreateBookCommand, UpdateBookCommand};
use crate::application::pagination::PageRequest;
use crate::domain::scopes::ApiScope;

use super::book_to_api;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{BookCreateRequest, BookUpdateRequest, ListQuery};
use crate::infra::http::state::ApiState;

pub async fn list_books(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::BookRead)
        .map_err(|_| ApiError::forbidden())?;

    let page = PageRequest::from_query(query.page, query.limit);
    let payload = state.books.list(page).await.map_err(book_to_api)?;

    // Pre-serialized cache payload; bypass Json to avoid re-encoding.
    Ok(([(header::CONTENT_TYPE, "application/json")], payload))
}

pub async fn get_book(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::BookRead)
        .map_err(|_| ApiError::forbidden())?;
    let can_write = principal.has(ApiScope::BookWrite);

    let detail = state.books.detail(id, can_write).await.map_err(book_to_api)?;

    Ok(Json(detail))
}

pub async fn create_book(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Json(payload): Json<BookCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::BookWrite)
        .map_err(|_| ApiError::forbidden())?;

    let command = CreateBookCommand {
        title: payload.title,
        cover_text: payload.cover_text,
        comment: payload.comment,
        author_id: payload.author_id,
    };

    let created = state
        .books
        .create(command, true)
        .await
        .map_err(book_to_api)?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, created.location)],
        Json(created.detail),
    ))
}

pub async fn update_book(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::BookWrite)
        .map_err(|_| ApiError::forbidden())?;

    let command = UpdateBookCommand {
        title: payload.title,
        cover_text: payload.cover_text,
        comment: payload.comment,
        author_id: payload.author_id,
    };

    state.books.update(id, command).await.map_err(book_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_book(
    State(state): State<ApiState>,
    Extension(principal): Extension<ApiPrincipal>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    principal
        .requires(ApiScope::BookWrite)
        .map_err(|_| ApiError::forbidden())?;

    state.books.delete(id).await.map_err(book_to_api)?;

    Ok(StatusCode::NO_CONTENT)
}
