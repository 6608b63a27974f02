//! Cache behavior across services: memoization, tag scoping, and
//! post-mutation invalidation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

use scaffale::application::authors::{AuthorService, CreateAuthorCommand};
use scaffale::application::books::{BookService, CreateBookCommand};
use scaffale::application::pagination::PageRequest;
use scaffale::application::projections::LinkBuilder;
use scaffale::application::repos::{AuthorsRepo, RepoError};
use scaffale::cache::{CacheConfig, ListCache};
use scaffale::domain::entities::AuthorRecord;
use scaffale::infra::db::memory::MemoryRepositories;

/// Delegating reader that counts how often list pages reach the store.
struct CountingAuthors {
    inner: Arc<MemoryRepositories>,
    list_calls: AtomicUsize,
}

impl CountingAuthors {
    fn new(inner: Arc<MemoryRepositories>) -> Self {
        Self {
            inner,
            list_calls: AtomicUsize::new(0),
        }
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthorsRepo for CountingAuthors {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError> {
        self.inner.find_by_id(id).await
    }

    async fn list_page(&self, page: PageRequest) -> Result<Vec<AuthorRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_page(page).await
    }
}

struct Harness {
    authors: AuthorService,
    books: BookService,
    reader: Arc<CountingAuthors>,
}

fn harness(config: CacheConfig) -> Harness {
    let repos = Arc::new(MemoryRepositories::new());
    let reader = Arc::new(CountingAuthors::new(repos.clone()));
    let cache = Arc::new(ListCache::new(&config));
    let links = LinkBuilder::new(Url::parse("http://localhost:3000").unwrap()).unwrap();

    let authors = AuthorService::new(
        reader.clone(),
        repos.clone(),
        repos.clone(),
        cache.clone(),
        links.clone(),
    );
    let books = BookService::new(repos.clone(), repos.clone(), repos.clone(), cache, links);

    Harness {
        authors,
        books,
        reader,
    }
}

fn author(lastname: &str) -> CreateAuthorCommand {
    CreateAuthorCommand {
        lastname: lastname.into(),
        firstname: None,
    }
}

#[tokio::test]
async fn identical_pages_serve_from_cache() {
    let h = harness(CacheConfig::default());
    h.authors.create(author("Hugo"), true).await.unwrap();

    let page = PageRequest::default();
    let first = h.authors.list(page).await.unwrap();
    let second = h.authors.list(page).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.reader.list_calls(), 1);
}

#[tokio::test]
async fn distinct_pages_are_cached_separately() {
    let h = harness(CacheConfig::default());
    for n in 0..4 {
        h.authors
            .create(author(&format!("Author {n}")), true)
            .await
            .unwrap();
    }

    let first = PageRequest::from_query(Some(1), Some(2));
    let second = PageRequest::from_query(Some(2), Some(2));

    h.authors.list(first).await.unwrap();
    h.authors.list(second).await.unwrap();
    h.authors.list(first).await.unwrap();
    h.authors.list(second).await.unwrap();

    assert_eq!(h.reader.list_calls(), 2);
}

#[tokio::test]
async fn mutations_refresh_lists_of_the_same_kind() {
    let h = harness(CacheConfig::default());
    let page = PageRequest::default();

    h.authors.list(page).await.unwrap();
    h.authors.create(author("Hugo"), true).await.unwrap();
    let refreshed = h.authors.list(page).await.unwrap();

    assert_eq!(h.reader.list_calls(), 2);
    let items: serde_json::Value = serde_json::from_slice(&refreshed).unwrap();
    assert_eq!(items.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn book_mutations_leave_author_lists_cached() {
    let h = harness(CacheConfig::default());
    let page = PageRequest::default();

    h.authors.list(page).await.unwrap();
    h.books
        .create(
            CreateBookCommand {
                title: "Notre-Dame".into(),
                cover_text: None,
                comment: None,
                author_id: None,
            },
            true,
        )
        .await
        .unwrap();
    h.authors.list(page).await.unwrap();

    assert_eq!(h.reader.list_calls(), 1);
}

#[tokio::test]
async fn disabled_cache_always_hits_the_store() {
    let h = harness(CacheConfig {
        enabled: false,
        ..Default::default()
    });
    h.authors.create(author("Hugo"), true).await.unwrap();

    let page = PageRequest::default();
    h.authors.list(page).await.unwrap();
    h.authors.list(page).await.unwrap();

    assert_eq!(h.reader.list_calls(), 2);
}

#[tokio::test]
async fn tiny_capacity_still_serves_correct_payloads() {
    let h = harness(CacheConfig {
        list_limit: 1,
        ..Default::default()
    });
    for n in 0..4 {
        h.authors
            .create(author(&format!("Author {n}")), true)
            .await
            .unwrap();
    }

    let first = PageRequest::from_query(Some(1), Some(2));
    let second = PageRequest::from_query(Some(2), Some(2));

    let page_one: serde_json::Value =
        serde_json::from_slice(&h.authors.list(first).await.unwrap()).unwrap();
    let page_two: serde_json::Value =
        serde_json::from_slice(&h.authors.list(second).await.unwrap()).unwrap();
    let page_one_again: serde_json::Value =
        serde_json::from_slice(&h.authors.list(first).await.unwrap()).unwrap();

    assert_eq!(page_one, page_one_again);
    assert_eq!(page_one.as_array().unwrap().len(), 2);
    assert_eq!(page_two.as_array().unwrap().len(), 2);
}
