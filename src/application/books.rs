//! Book service operations: list, detail, create, update, delete.
//!
//! Books carry an optional reference to their author. The reference is
//! resolved against the store at write time; an id that does not resolve
//! degrades to "no author" rather than failing the request.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::projections::{BookDetail, BookListItem, LinkBuilder};
use crate::application::repos::{
    AuthorsRepo, BooksRepo, BooksWriteRepo, CreateBookParams, RepoError, UpdateBookParams,
};
use crate::cache::{ListCache, ListKey, ResourceKind};
use crate::domain::validation::{Violation, validate_book};

#[derive(Debug, Error)]
pub enum BookError {
    #[error("book not found")]
    NotFound,
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<Violation>),
    #[error("failed to serialize list payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateBookCommand {
    pub title: String,
    pub cover_text: Option<String>,
    pub comment: Option<String>,
    pub author_id: Option<Uuid>,
}

/// Partial update with explicit field presence: `None` preserves the
/// stored value, `Some(None)` clears a nullable field. Omitting
/// `author_id` therefore keeps the current author.
#[derive(Debug, Clone, Default)]
pub struct UpdateBookCommand {
    pub title: Option<String>,
    pub cover_text: Option<Option<String>>,
    pub comment: Option<Option<String>>,
    pub author_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone)]
pub struct CreatedBook {
    pub detail: BookDetail,
    pub location: String,
}

#[derive(Clone)]
pub struct BookService {
    reader: Arc<dyn BooksRepo>,
    writer: Arc<dyn BooksWriteRepo>,
    authors: Arc<dyn AuthorsRepo>,
    cache: Arc<ListCache>,
    links: LinkBuilder,
}

impl BookService {
    pub fn new(
        reader: Arc<dyn BooksRepo>,
        writer: Arc<dyn BooksWriteRepo>,
        authors: Arc<dyn AuthorsRepo>,
        cache: Arc<ListCache>,
        links: LinkBuilder,
    ) -> Self {
        Self {
            reader,
            writer,
            authors,
            cache,
            links,
        }
    }

    /// Serialized list page, memoized under (books, page, limit).
    pub async fn list(&self, page: PageRequest) -> Result<Bytes, BookError> {
        let key = ListKey::new(ResourceKind::Books, page);
        self.cache
            .get_or_compute(key, || async {
                let records = self.reader.list_page(page).await?;
                let items: Vec<BookListItem> = records
                    .iter()
                    .map(|record| self.links.book_list_item(record))
                    .collect();
                Ok(Bytes::from(serde_json::to_vec(&items)?))
            })
            .await
    }

    /// Detail projection with the owning author summary, when any.
    pub async fn detail(&self, id: Uuid, can_write: bool) -> Result<BookDetail, BookError> {
        let record = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(BookError::NotFound)?;
        let author = match record.author_id {
            Some(author_id) => self.authors.find_by_id(author_id).await?,
            None => None,
        };
        Ok(self.links.book_detail(&record, author.as_ref(), can_write))
    }

    pub async fn create(
        &self,
        command: CreateBookCommand,
        can_write: bool,
    ) -> Result<CreatedBook, BookError> {
        validate_book(&command.title).map_err(BookError::Validation)?;
        let author_id = self.resolve_author(command.author_id).await?;

        let record = self
            .writer
            .insert(CreateBookParams {
                title: command.title,
                cover_text: command.cover_text,
                comment: command.comment,
                author_id,
            })
            .await?;
        self.flush_lists();

        let author = match record.author_id {
            Some(author_id) => self.authors.find_by_id(author_id).await?,
            None => None,
        };
        let location = self.links.book(record.id);
        Ok(CreatedBook {
            detail: self.links.book_detail(&record, author.as_ref(), can_write),
            location,
        })
    }

    pub async fn update(&self, id: Uuid, command: UpdateBookCommand) -> Result<(), BookError> {
        let existing = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(BookError::NotFound)?;

        let title = command.title.unwrap_or(existing.title);
        let cover_text = match command.cover_text {
            Some(cover_text) => cover_text,
            None => existing.cover_text,
        };
        let comment = match command.comment {
            Some(comment) => comment,
            None => existing.comment,
        };
        let author_id = match command.author_id {
            // Field absent: keep the current author.
            None => existing.author_id,
            // Explicit null: detach.
            Some(None) => None,
            Some(Some(author_id)) => self.resolve_author(Some(author_id)).await?,
        };

        validate_book(&title).map_err(BookError::Validation)?;

        self.writer
            .update(UpdateBookParams {
                id,
                title,
                cover_text,
                comment,
                author_id,
            })
            .await
            .map_err(not_found_or_repo)?;
        self.flush_lists();
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), BookError> {
        self.writer.delete(id).await.map_err(not_found_or_repo)?;
        self.flush_lists();
        Ok(())
    }

    // Post-commit invalidation hook shared by every mutating operation.
    fn flush_lists(&self) {
        self.cache.invalidate(ResourceKind::Books.tag());
    }

    async fn resolve_author(&self, author_id: Option<Uuid>) -> Result<Option<Uuid>, BookError> {
        let Some(author_id) = author_id else {
            return Ok(None);
        };
        let resolved = self.authors.find_by_id(author_id).await?;
        if resolved.is_none() {
            debug!(%author_id, "author id did not resolve, storing book without author");
        }
        Ok(resolved.map(|author| author.id))
    }
}

fn not_found_or_repo(err: RepoError) -> BookError {
    match err {
        RepoError::NotFound => BookError::NotFound,
        other => BookError::Repo(other),
    }
}
