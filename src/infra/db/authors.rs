use async_trait::async_trait;
use sqlx::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    AuthorsRepo, AuthorsWriteRepo, CreateAuthorParams, RepoError, UpdateAuthorParams,
};
use crate::domain::entities::AuthorRecord;

use super::{PostgresRepositories, map_sqlx_error};

const COLUMNS: &str = "id, lastname, firstname, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: Uuid,
    lastname: String,
    firstname: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<AuthorRow> for AuthorRecord {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.id,
            lastname: row.lastname,
            firstname: row.firstname,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl AuthorsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError> {
        let row = query_as::<_, AuthorRow>(&format!(
            "SELECT {COLUMNS} FROM authors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(AuthorRecord::from))
    }

    async fn list_page(&self, page: PageRequest) -> Result<Vec<AuthorRecord>, RepoError> {
        let rows = query_as::<_, AuthorRow>(&format!(
            "SELECT {COLUMNS} FROM authors \
             ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(AuthorRecord::from).collect())
    }
}

#[async_trait]
impl AuthorsWriteRepo for PostgresRepositories {
    async fn insert(&self, params: CreateAuthorParams) -> Result<AuthorRecord, RepoError> {
        let row = query_as::<_, AuthorRow>(&format!(
            "INSERT INTO authors (lastname, firstname) VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(&params.lastname)
        .bind(&params.firstname)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update(&self, params: UpdateAuthorParams) -> Result<AuthorRecord, RepoError> {
        let row = query_as::<_, AuthorRow>(&format!(
            "UPDATE authors SET lastname = $2, firstname = $3, updated_at = now() \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(params.id)
        .bind(&params.lastname)
        .bind(&params.firstname)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(AuthorRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // Owned books are detached by the schema's ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
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
