//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::domain::entities::{AuthorRecord, BookRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateAuthorParams {
    pub lastname: String,
    pub firstname: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateAuthorParams {
    pub id: Uuid,
    pub lastname: String,
    pub firstname: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateBookParams {
    pub title: String,
    pub cover_text: Option<String>,
    pub comment: Option<String>,
    pub author_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct UpdateBookParams {
    pub id: Uuid,
    pub title: String,
    pub cover_text: Option<String>,
    pub comment: Option<String>,
    pub author_id: Option<Uuid>,
}

/// Read side of the author store. Pages follow the store's natural order
/// (creation time, then id).
#[async_trait]
pub trait AuthorsRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError>;

    async fn list_page(&self, page: PageRequest) -> Result<Vec<AuthorRecord>, RepoError>;
}

#[async_trait]
pub trait AuthorsWriteRepo: Send + Sync {
    async fn insert(&self, params: CreateAuthorParams) -> Result<AuthorRecord, RepoError>;

    async fn update(&self, params: UpdateAuthorParams) -> Result<AuthorRecord, RepoError>;

    /// Removes the author. Owned books survive with their author reference
    /// cleared. Returns `RepoError::NotFound` when the id does not resolve.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait BooksRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookRecord>, RepoError>;

    async fn list_page(&self, page: PageRequest) -> Result<Vec<BookRecord>, RepoError>;

    /// Read-through query for an author's owned books.
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<BookRecord>, RepoError>;
}

#[async_trait]
pub trait BooksWriteRepo: Send + Sync {
    async fn insert(&self, params: CreateBookParams) -> Result<BookRecord, RepoError>;

    async fn update(&self, params: UpdateBookParams) -> Result<BookRecord, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Liveness probe over whichever store backs the service.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
