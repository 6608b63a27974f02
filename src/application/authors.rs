//! Author service operations: list, detail, create, update, delete.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::projections::{AuthorDetail, AuthorListItem, LinkBuilder};
use crate::application::repos::{
    AuthorsRepo, AuthorsWriteRepo, BooksRepo, CreateAuthorParams, RepoError, UpdateAuthorParams,
};
use crate::cache::{ListCache, ListKey, ResourceKind};
use crate::domain::validation::{Violation, validate_author};

#[derive(Debug, Error)]
pub enum AuthorError {
    #[error("author not found")]
    NotFound,
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<Violation>),
    #[error("failed to serialize list payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateAuthorCommand {
    pub lastname: String,
    pub firstname: Option<String>,
}

/// Partial update. `None` preserves the stored value; for the nullable
/// `firstname`, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateAuthorCommand {
    pub lastname: Option<String>,
    pub firstname: Option<Option<String>>,
}

/// A created author plus the canonical URL for its detail resource.
#[derive(Debug, Clone)]
pub struct CreatedAuthor {
    pub detail: AuthorDetail,
    pub location: String,
}

#[derive(Clone)]
pub struct AuthorService {
    reader: Arc<dyn AuthorsRepo>,
    writer: Arc<dyn AuthorsWriteRepo>,
    books: Arc<dyn BooksRepo>,
    cache: Arc<ListCache>,
    links: LinkBuilder,
}

impl AuthorService {
    pub fn new(
        reader: Arc<dyn AuthorsRepo>,
        writer: Arc<dyn AuthorsWriteRepo>,
        books: Arc<dyn BooksRepo>,
        cache: Arc<ListCache>,
        links: LinkBuilder,
    ) -> Self {
        Self {
            reader,
            writer,
            books,
            cache,
            links,
        }
    }

    /// Serialized list page, memoized under (authors, page, limit).
    pub async fn list(&self, page: PageRequest) -> Result<Bytes, AuthorError> {
        let key = ListKey::new(ResourceKind::Authors, page);
        self.cache
            .get_or_compute(key, || async {
                let records = self.reader.list_page(page).await?;
                let items: Vec<AuthorListItem> = records
                    .iter()
                    .map(|record| self.links.author_list_item(record))
                    .collect();
                Ok(Bytes::from(serde_json::to_vec(&items)?))
            })
            .await
    }

    /// Detail projection with the owned books resolved read-through.
    pub async fn detail(&self, id: Uuid, can_write: bool) -> Result<AuthorDetail, AuthorError> {
        let record = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(AuthorError::NotFound)?;
        let books = self.books.list_by_author(record.id).await?;
        Ok(self.links.author_detail(&record, &books, can_write))
    }

    pub async fn create(
        &self,
        command: CreateAuthorCommand,
        can_write: bool,
    ) -> Result<CreatedAuthor, AuthorError> {
        validate_author(&command.lastname, command.firstname.as_deref())
            .map_err(AuthorError::Validation)?;

        let record = self
            .writer
            .insert(CreateAuthorParams {
                lastname: command.lastname,
                firstname: command.firstname,
            })
            .await?;
        self.flush_lists();

        let location = self.links.author(record.id);
        Ok(CreatedAuthor {
            detail: self.links.author_detail(&record, &[], can_write),
            location,
        })
    }

    pub async fn update(&self, id: Uuid, command: UpdateAuthorCommand) -> Result<(), AuthorError> {
        let existing = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(AuthorError::NotFound)?;

        let lastname = command.lastname.unwrap_or(existing.lastname);
        let firstname = match command.firstname {
            Some(firstname) => firstname,
            None => existing.firstname,
        };

        validate_author(&lastname, firstname.as_deref()).map_err(AuthorError::Validation)?;

        self.writer
            .update(UpdateAuthorParams {
                id,
                lastname,
                firstname,
            })
            .await
            .map_err(not_found_or_repo)?;
        self.flush_lists();
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AuthorError> {
        self.writer.delete(id).await.map_err(not_found_or_repo)?;
        self.flush_lists();
        Ok(())
    }

    // Post-commit invalidation hook shared by every mutating operation.
    fn flush_lists(&self) {
        self.cache.invalidate(ResourceKind::Authors.tag());
    }
}

fn not_found_or_repo(err: RepoError) -> AuthorError {
    match err {
        RepoError::NotFound => AuthorError::NotFound,
        other => AuthorError::Repo(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::OffsetDateTime;
    use url::Url;

    use crate::cache::CacheConfig;
    use crate::domain::entities::{AuthorRecord, BookRecord};

    #[derive(Default)]
    struct StubAuthorsRepo {
        record: Option<AuthorRecord>,
        list_calls: AtomicUsize,
    }

    #[async_trait]
    impl AuthorsRepo for StubAuthorsRepo {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError> {
            Ok(self.record.clone().filter(|record| record.id == id))
        }

        async fn list_page(&self, _page: PageRequest) -> Result<Vec<AuthorRecord>, RepoError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.record.clone().into_iter().collect())
        }
    }

    #[derive(Default)]
    struct RecordingAuthorsWriter {
        inserted: Mutex<Vec<CreateAuthorParams>>,
        updated: Mutex<Vec<UpdateAuthorParams>>,
        deleted: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl AuthorsWriteRepo for RecordingAuthorsWriter {
        async fn insert(&self, params: CreateAuthorParams) -> Result<AuthorRecord, RepoError> {
            let record = sample_author(Uuid::new_v4(), &params.lastname);
            self.inserted.lock().unwrap().push(params);
            Ok(record)
        }

        async fn update(&self, params: UpdateAuthorParams) -> Result<AuthorRecord, RepoError> {
            let record = sample_author(params.id, &params.lastname);
            self.updated.lock().unwrap().push(params);
            Ok(record)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
            self.deleted.lock().unwrap().push(id);
            Ok(())
        }
    }

    struct EmptyBooksRepo;

    #[async_trait]
    impl BooksRepo for EmptyBooksRepo {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<BookRecord>, RepoError> {
            Ok(None)
        }

        async fn list_page(&self, _page: PageRequest) -> Result<Vec<BookRecord>, RepoError> {
            Ok(Vec::new())
        }

        async fn list_by_author(&self, _author_id: Uuid) -> Result<Vec<BookRecord>, RepoError> {
            Ok(Vec::new())
        }
    }

    fn sample_author(id: Uuid, lastname: &str) -> AuthorRecord {
        AuthorRecord {
            id,
            lastname: lastname.to_string(),
            firstname: Some("Victor".into()),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn service(reader: Arc<StubAuthorsRepo>, writer: Arc<RecordingAuthorsWriter>) -> AuthorService {
        AuthorService::new(
            reader,
            writer,
            Arc::new(EmptyBooksRepo),
            Arc::new(ListCache::new(&CacheConfig::default())),
            LinkBuilder::new(Url::parse("http://localhost:3000").unwrap()).unwrap(),
        )
    }

    #[tokio::test]
    async fn repeated_list_hits_the_store_once() {
        let reader = Arc::new(StubAuthorsRepo {
            record: Some(sample_author(Uuid::new_v4(), "Hugo")),
            ..Default::default()
        });
        let service = service(reader.clone(), Arc::new(RecordingAuthorsWriter::default()));

        let page = PageRequest::default();
        let first = service.list(page).await.expect("list succeeds");
        let second = service.list(page).await.expect("list succeeds");

        assert_eq!(first, second);
        assert_eq!(reader.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn create_invalidates_the_list_cache() {
        let reader = Arc::new(StubAuthorsRepo {
            record: Some(sample_author(Uuid::new_v4(), "Hugo")),
            ..Default::default()
        });
        let service = service(reader.clone(), Arc::new(RecordingAuthorsWriter::default()));

        let page = PageRequest::default();
        service.list(page).await.expect("list succeeds");
        service
            .create(
                CreateAuthorCommand {
                    lastname: "Verne".into(),
                    firstname: None,
                },
                true,
            )
            .await
            .expect("create succeeds");
        service.list(page).await.expect("list succeeds");

        assert_eq!(reader.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_create_never_reaches_the_store() {
        let writer = Arc::new(RecordingAuthorsWriter::default());
        let service = service(Arc::new(StubAuthorsRepo::default()), writer.clone());

        let result = service
            .create(
                CreateAuthorCommand {
                    lastname: "  ".into(),
                    firstname: Some("x".repeat(300)),
                },
                true,
            )
            .await;

        match result {
            Err(AuthorError::Validation(violations)) => {
                let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
                assert_eq!(fields, vec!["lastname", "firstname"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(writer.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_preserves_omitted_fields() {
        let id = Uuid::new_v4();
        let reader = Arc::new(StubAuthorsRepo {
            record: Some(sample_author(id, "Hugo")),
            ..Default::default()
        });
        let writer = Arc::new(RecordingAuthorsWriter::default());
        let service = service(reader, writer.clone());

        service
            .update(
                id,
                UpdateAuthorCommand {
                    lastname: Some("Hugo-Lopes".into()),
                    firstname: None,
                },
            )
            .await
            .expect("update succeeds");

        let updated = writer.updated.lock().unwrap();
        assert_eq!(updated[0].lastname, "Hugo-Lopes");
        assert_eq!(updated[0].firstname.as_deref(), Some("Victor"));
    }

    #[tokio::test]
    async fn update_clears_firstname_on_explicit_null() {
        let id = Uuid::new_v4();
        let reader = Arc::new(StubAuthorsRepo {
            record: Some(sample_author(id, "Hugo")),
            ..Default::default()
        });
        let writer = Arc::new(RecordingAuthorsWriter::default());
        let service = service(reader, writer.clone());

        service
            .update(
                id,
                UpdateAuthorCommand {
                    lastname: None,
                    firstname: Some(None),
                },
            )
            .await
            .expect("update succeeds");

        assert_eq!(writer.updated.lock().unwrap()[0].firstname, None);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let service = service(
            Arc::new(StubAuthorsRepo::default()),
            Arc::new(RecordingAuthorsWriter::default()),
        );
        let result = service.update(Uuid::new_v4(), UpdateAuthorCommand::default()).await;
        assert!(matches!(result, Err(AuthorError::NotFound)));
    }

    #[tokio::test]
    async fn delete_removes_and_flushes() {
        let id = Uuid::new_v4();
        let reader = Arc::new(StubAuthorsRepo {
            record: Some(sample_author(id, "Hugo")),
            ..Default::default()
        });
        let writer = Arc::new(RecordingAuthorsWriter::default());
        let service = service(reader.clone(), writer.clone());

        let page = PageRequest::default();
        service.list(page).await.expect("list succeeds");
        service.delete(id).await.expect("delete succeeds");
        service.list(page).await.expect("list succeeds");

        assert_eq!(writer.deleted.lock().unwrap().as_slice(), &[id]);
        assert_eq!(reader.list_calls.load(Ordering::SeqCst), 2);
    }
}
