//! In-memory repositories for development and tests.
//!
//! Selected when no database URL is configured. Mirrors the Postgres
//! schema's behavior, including detaching owned books when their author
//! row is removed.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    AuthorsRepo, AuthorsWriteRepo, BooksRepo, BooksWriteRepo, CreateAuthorParams,
    CreateBookParams, RepoError, StoreHealth, UpdateAuthorParams, UpdateBookParams,
};
use crate::domain::entities::{AuthorRecord, BookRecord};

#[derive(Default)]
pub struct MemoryRepositories {
    authors: RwLock<HashMap<Uuid, AuthorRecord>>,
    books: RwLock<HashMap<Uuid, BookRecord>>,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<T: Clone>(mut records: Vec<T>, page: PageRequest) -> Vec<T>
where
    T: NaturalOrder,
{
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    records
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

// Natural store order: creation time, then id.
trait NaturalOrder {
    fn sort_key(&self) -> (OffsetDateTime, Uuid);
}

impl NaturalOrder for AuthorRecord {
    fn sort_key(&self) -> (OffsetDateTime, Uuid) {
        (self.created_at, self.id)
    }
}

impl NaturalOrder for BookRecord {
    fn sort_key(&self) -> (OffsetDateTime, Uuid) {
        (self.created_at, self.id)
    }
}

#[async_trait]
impl AuthorsRepo for MemoryRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError> {
        Ok(self.authors.read().await.get(&id).cloned())
    }

    async fn list_page(&self, page: PageRequest) -> Result<Vec<AuthorRecord>, RepoError> {
        let records: Vec<_> = self.authors.read().await.values().cloned().collect();
        Ok(page_of(records, page))
    }
}

#[async_trait]
impl AuthorsWriteRepo for MemoryRepositories {
    async fn insert(&self, params: CreateAuthorParams) -> Result<AuthorRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = AuthorRecord {
            id: Uuid::new_v4(),
            lastname: params.lastname,
            firstname: params.firstname,
            created_at: now,
            updated_at: now,
        };
        self.authors.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, params: UpdateAuthorParams) -> Result<AuthorRecord, RepoError> {
        let mut authors = self.authors.write().await;
        let record = authors.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        record.lastname = params.lastname;
        record.firstname = params.firstname;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut authors = self.authors.write().await;
        if authors.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        drop(authors);

        // Same detachment the schema's ON DELETE SET NULL performs.
        let mut books = self.books.write().await;
        for book in books.values_mut() {
            if book.author_id == Some(id) {
                book.author_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BooksRepo for MemoryRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookRecord>, RepoError> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn list_page(&self, page: PageRequest) -> Result<Vec<BookRecord>, RepoError> {
        let records: Vec<_> = self.books.read().await.values().cloned().collect();
        Ok(page_of(records, page))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<BookRecord>, RepoError> {
        let mut records: Vec<_> = self
            .books
            .read()
            .await
            .values()
            .filter(|book| book.author_id == Some(author_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Ok(records)
    }
}

#[async_trait]
impl BooksWriteRepo for MemoryRepositories {
    async fn insert(&self, params: CreateBookParams) -> Result<BookRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let record = BookRecord {
            id: Uuid::new_v4(),
            title: params.title,
            cover_text: params.cover_text,
            comment: params.comment,
            author_id: params.author_id,
            created_at: now,
            updated_at: now,
        };
        self.books.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, params: UpdateBookParams) -> Result<BookRecord, RepoError> {
        let mut books = self.books.write().await;
        let record = books.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        record.title = params.title;
        record.cover_text = params.cover_text;
        record.comment = params.comment;
        record.author_id = params.author_id;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.books.write().await.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for MemoryRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_an_id_once() {
        let repos = MemoryRepositories::new();
        let record = AuthorsWriteRepo::insert(
            &repos,
            CreateAuthorParams {
                lastname: "Hugo".into(),
                firstname: None,
            },
        )
        .await
        .expect("insert succeeds");

        let found = AuthorsRepo::find_by_id(&repos, record.id)
            .await
            .expect("lookup succeeds");
        assert_eq!(found.map(|a| a.id), Some(record.id));
    }

    #[tokio::test]
    async fn deleting_an_author_detaches_owned_books() {
        let repos = MemoryRepositories::new();
        let author = AuthorsWriteRepo::insert(
            &repos,
            CreateAuthorParams {
                lastname: "Hugo".into(),
                firstname: None,
            },
        )
        .await
        .expect("author inserted");
        let book = BooksWriteRepo::insert(
            &repos,
            CreateBookParams {
                title: "Les Misérables".into(),
                cover_text: None,
                comment: None,
                author_id: Some(author.id),
            },
        )
        .await
        .expect("book inserted");

        AuthorsWriteRepo::delete(&repos, author.id)
            .await
            .expect("delete succeeds");

        let survivor = BooksRepo::find_by_id(&repos, book.id)
            .await
            .expect("lookup succeeds")
            .expect("book survives author deletion");
        assert_eq!(survivor.author_id, None);
    }

    #[tokio::test]
    async fn list_pages_follow_creation_order() {
        let repos = MemoryRepositories::new();
        let mut ids = Vec::new();
        for n in 0..5 {
            let record = AuthorsWriteRepo::insert(
                &repos,
                CreateAuthorParams {
                    lastname: format!("Author {n}"),
                    firstname: None,
                },
            )
            .await
            .expect("insert succeeds");
            ids.push(record.id);
            // Keep creation timestamps strictly increasing.
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }

        let first = AuthorsRepo::list_page(&repos, PageRequest::from_query(Some(1), Some(3)))
            .await
            .expect("list succeeds");
        let second = AuthorsRepo::list_page(&repos, PageRequest::from_query(Some(2), Some(3)))
            .await
            .expect("list succeeds");

        let listed: Vec<_> = first.iter().chain(second.iter()).map(|a| a.id).collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_reports_not_found() {
        let repos = MemoryRepositories::new();
        let result = BooksWriteRepo::delete(&repos, Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
