//! Serialized field projections and hyperlink assembly.
//!
//! Each resource kind has a "list" projection (used inside cached list
//! payloads) and a "detail" projection (a superset carrying relation data).
//! Links are assembled explicitly from the entity id and the caller's
//! granted scopes; list items carry only `self` so cached payloads stay
//! caller-independent.

use serde::Serialize;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::domain::entities::{AuthorRecord, BookRecord};

#[derive(Debug, Clone, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,
}

/// The configured public base cannot carry resource paths (e.g. a
/// `data:` or `mailto:` URL).
#[derive(Debug, Error)]
#[error("public base url cannot carry resource paths")]
pub struct InvalidBaseUrl;

/// Builds canonical resource URLs from the configured public base.
///
/// The base is normalized once at construction, so link assembly is
/// plain string formatting and cannot fail.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    base: String,
}

impl LinkBuilder {
    pub fn new(base: Url) -> Result<Self, InvalidBaseUrl> {
        if base.cannot_be_a_base() {
            return Err(InvalidBaseUrl);
        }
        Ok(Self {
            base: base.as_str().trim_end_matches('/').to_owned(),
        })
    }

    pub fn author(&self, id: Uuid) -> String {
        self.resource("authors", id)
    }

    pub fn book(&self, id: Uuid) -> String {
        self.resource("books", id)
    }

    fn resource(&self, collection: &str, id: Uuid) -> String {
        format!("{}/{collection}/{id}", self.base)
    }

    fn links(&self, href: String, can_write: bool) -> Links {
        Links {
            update: can_write.then(|| href.clone()),
            delete: can_write.then(|| href.clone()),
            self_href: href,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorListItem {
    pub id: Uuid,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    pub _links: Links,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorDetail {
    pub id: Uuid,
    pub lastname: String,
    pub firstname: Option<String>,
    pub books: Vec<BookSummary>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
    pub _links: Links,
}

/// Compact author reference embedded in book payloads.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    pub _links: Links,
}

/// Compact book reference embedded in author detail payloads.
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub _links: Links,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookListItem {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub _links: Links,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub id: Uuid,
    pub title: String,
    pub cover_text: Option<String>,
    pub comment: Option<String>,
    pub author: Option<AuthorSummary>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
    pub _links: Links,
}

impl LinkBuilder {
    pub fn author_list_item(&self, record: &AuthorRecord) -> AuthorListItem {
        AuthorListItem {
            id: record.id,
            lastname: record.lastname.clone(),
            firstname: record.firstname.clone(),
            _links: self.links(self.author(record.id), false),
        }
    }

    pub fn author_detail(
        &self,
        record: &AuthorRecord,
        books: &[BookRecord],
        can_write: bool,
    ) -> AuthorDetail {
        AuthorDetail {
            id: record.id,
            lastname: record.lastname.clone(),
            firstname: record.firstname.clone(),
            books: books.iter().map(|book| self.book_summary(book)).collect(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            _links: self.links(self.author(record.id), can_write),
        }
    }

    pub fn author_summary(&self, record: &AuthorRecord) -> AuthorSummary {
        AuthorSummary {
            id: record.id,
            lastname: record.lastname.clone(),
            firstname: record.firstname.clone(),
            _links: self.links(self.author(record.id), false),
        }
    }

    pub fn book_summary(&self, record: &BookRecord) -> BookSummary {
        BookSummary {
            id: record.id,
            title: record.title.clone(),
            _links: self.links(self.book(record.id), false),
        }
    }

    pub fn book_list_item(&self, record: &BookRecord) -> BookListItem {
        BookListItem {
            id: record.id,
            title: record.title.clone(),
            cover_text: record.cover_text.clone(),
            comment: record.comment.clone(),
            _links: self.links(self.book(record.id), false),
        }
    }

    pub fn book_detail(
        &self,
        record: &BookRecord,
        author: Option<&AuthorRecord>,
        can_write: bool,
    ) -> BookDetail {
        BookDetail {
            id: record.id,
            title: record.title.clone(),
            cover_text: record.cover_text.clone(),
            comment: record.comment.clone(),
            author: author.map(|record| self.author_summary(record)),
            created_at: record.created_at,
            updated_at: record.updated_at,
            _links: self.links(self.book(record.id), can_write),
        }
    }
}
