//! JSON API handlers.

mod authors;
mod books;

pub use authors::{create_author, delete_author, get_author, list_authors, update_author};
pub use books::{create_book, delete_book, get_book, list_books, update_book};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::authors::AuthorError;
use crate::application::books::BookError;
use crate::application::repos::RepoError;

use super::error::{ApiError, codes};
use super::state::ApiState;

pub async fn healthz(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    state.health.ping().await.map_err(|err| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::UNAVAILABLE,
            "store unavailable",
            Some(err.to_string()),
        )
    })?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

pub(super) fn author_to_api(err: AuthorError) -> ApiError {
    match err {
        AuthorError::NotFound => ApiError::not_found("author not found"),
        AuthorError::Validation(violations) => ApiError::validation(violations),
        AuthorError::Serialize(err) => ApiError::internal(Some(err.to_string())),
        AuthorError::Repo(err) => repo_to_api(err),
    }
}

pub(super) fn book_to_api(err: BookError) -> ApiError {
    match err {
        BookError::NotFound => ApiError::not_found("book not found"),
        BookError::Validation(violations) => ApiError::validation(violations),
        BookError::Serialize(err) => ApiError::internal(Some(err.to_string())),
        BookError::Repo(err) => repo_to_api(err),
    }
}

fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "integrity error",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "storage error",
            Some(message),
        ),
    }
}
