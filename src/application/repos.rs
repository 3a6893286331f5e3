//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{BookRecord, CategoryRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateBookParams {
    pub title: String,
    pub author: String,
    pub category_name: String,
}

#[derive(Debug, Clone)]
pub struct UpdateBookParams {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category_name: String,
}

/// Read-side book lookups. Absence is `None`/empty, never an error.
#[async_trait]
pub trait BooksRepo: Send + Sync {
    /// Exact match on both fields; when several rows match, the lowest id wins.
    async fn find_by_title_and_author(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Option<BookRecord>, RepoError>;

    /// All books referencing the given category, order unspecified.
    async fn find_by_category(&self, category_id: i64) -> Result<Vec<BookRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError>;

    async fn exists(&self, id: i64) -> Result<bool, RepoError>;
}

/// Write-side book mutations.
///
/// `create_book` and `update_book` resolve the category by name, creating
/// it when absent, and perform the category and book writes atomically.
#[async_trait]
pub trait BooksWriteRepo: Send + Sync {
    async fn create_book(&self, params: CreateBookParams) -> Result<BookRecord, RepoError>;

    /// Fails with `RepoError::NotFound` when no book has the given id.
    async fn update_book(&self, params: UpdateBookParams) -> Result<BookRecord, RepoError>;

    /// Fails with `RepoError::NotFound` when no book has the given id.
    async fn delete_book(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRecord>, RepoError>;
}
