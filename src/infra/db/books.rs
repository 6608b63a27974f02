use async_trait::async_trait;
use sqlx::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    BooksRepo, BooksWriteRepo, CreateBookParams, RepoError, UpdateBookParams,
};
use crate::domain::entities::BookRecord;

use super::{PostgresRepositories, map_sqlx_error};

const COLUMNS: &str = "id, title, cover_text, comment, author_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    cover_text: Option<String>,
    comment: Option<String>,
    author_id: Option<Uuid>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<BookRow> for BookRecord {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            cover_text: row.cover_text,
            comment: row.comment,
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl BooksRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookRecord>, RepoError> {
        let row = query_as::<_, BookRow>(&format!("SELECT {COLUMNS} FROM books WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(BookRecord::from))
    }

    async fn list_page(&self, page: PageRequest) -> Result<Vec<BookRecord>, RepoError> {
        let rows = query_as::<_, BookRow>(&format!(
            "SELECT {COLUMNS} FROM books \
             ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BookRecord::from).collect())
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<BookRecord>, RepoError> {
        let rows = query_as::<_, BookRow>(&format!(
            "SELECT {COLUMNS} FROM books WHERE author_id = $1 \
             ORDER BY created_at ASC, id ASC"
        ))
        .bind(author_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(BookRecord::from).collect())
    }
}

#[async_trait]
impl BooksWriteRepo for PostgresRepositories {
    async fn insert(&self, params: CreateBookParams) -> Result<BookRecord, RepoError> {
        let row = query_as::<_, BookRow>(&format!(
            "INSERT INTO books (title, cover_text, comment, author_id) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        ))
        .bind(&params.title)
        .bind(&params.cover_text)
        .bind(&params.comment)
        .bind(params.author_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update(&self, params: UpdateBookParams) -> Result<BookRecord, RepoError> {
        let row = query_as::<_, BookRow>(&format!(
            "UPDATE books SET title = $2, cover_text = $3, comment = $4, author_id = $5, \
             updated_at = now() WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(params.id)
        .bind(&params.title)
        .bind(&params.cover_text)
        .bind(&params.comment)
        .bind(params.author_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(BookRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
