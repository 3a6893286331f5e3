use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::{
    application::repos::{
        BooksRepo, BooksWriteRepo, CreateBookParams, RepoError, UpdateBookParams,
    },
    domain::entities::{BookRecord, CategoryRecord},
};

use super::PostgresRepositories;

const BOOK_SELECT: &str = "SELECT b.id, b.title, b.author, c.id AS category_id, c.name AS category_name \
     FROM books b \
     INNER JOIN categories c ON c.id = b.category_id";

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: String,
    category_id: i64,
    category_name: String,
}

impl From<BookRow> for BookRecord {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            category: CategoryRecord {
                id: row.category_id,
                name: row.category_name,
            },
        }
    }
}

#[async_trait]
impl BooksRepo for PostgresRepositories {
    async fn find_by_title_and_author(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Option<BookRecord>, RepoError> {
        let sql = format!("{BOOK_SELECT} WHERE b.title = $1 AND b.author = $2 ORDER BY b.id LIMIT 1");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(title)
            .bind(author)
            .fetch_optional(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(row.map(BookRecord::from))
    }

    async fn find_by_category(&self, category_id: i64) -> Result<Vec<BookRecord>, RepoError> {
        let sql = format!("{BOOK_SELECT} WHERE b.category_id = $1 ORDER BY b.id");
        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(category_id)
            .fetch_all(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(rows.into_iter().map(BookRecord::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError> {
        let sql = format!("{BOOK_SELECT} WHERE b.id = $1");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(row.map(BookRecord::from))
    }

    async fn exists(&self, id: i64) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(RepoError::from_persistence)
    }
}

#[async_trait]
impl BooksWriteRepo for PostgresRepositories {
    async fn create_book(&self, params: CreateBookParams) -> Result<BookRecord, RepoError> {
        let CreateBookParams {
            title,
            author,
            category_name,
        } = params;

        let mut tx = self.begin().await.map_err(RepoError::from_persistence)?;

        let category = resolve_or_create_category(&mut tx, &category_name).await?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO books (title, author, category_id) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&title)
        .bind(&author)
        .bind(category.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepoError::from_persistence)?;

        tx.commit().await.map_err(RepoError::from_persistence)?;

        Ok(BookRecord {
            id,
            title,
            author,
            category,
        })
    }

    async fn update_book(&self, params: UpdateBookParams) -> Result<BookRecord, RepoError> {
        let UpdateBookParams {
            id,
            title,
            author,
            category_name,
        } = params;

        let mut tx = self.begin().await.map_err(RepoError::from_persistence)?;

        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(RepoError::from_persistence)?;
        if locked.is_none() {
            return Err(RepoError::NotFound);
        }

        let category = resolve_or_create_category(&mut tx, &category_name).await?;

        sqlx::query("UPDATE books SET title = $2, author = $3, category_id = $4 WHERE id = $1")
            .bind(id)
            .bind(&title)
            .bind(&author)
            .bind(category.id)
            .execute(&mut *tx)
            .await
            .map_err(RepoError::from_persistence)?;

        tx.commit().await.map_err(RepoError::from_persistence)?;

        Ok(BookRecord {
            id,
            title,
            author,
            category,
        })
    }

    async fn delete_book(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

/// Look up the category by name, inserting a row when absent.
///
/// Runs inside the caller's transaction so the category write commits (or
/// rolls back) together with the book write.
async fn resolve_or_create_category(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<CategoryRecord, RepoError> {
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM categories WHERE name = $1 ORDER BY id LIMIT 1",
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await
    .map_err(RepoError::from_persistence)?;

    let id = match existing {
        Some(id) => id,
        None => sqlx::query_scalar::<_, i64>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id",
        )
        .bind(name)
        .fetch_one(&mut **tx)
        .await
        .map_err(RepoError::from_persistence)?,
    };

    Ok(CategoryRecord {
        id,
        name: name.to_string(),
    })
}
