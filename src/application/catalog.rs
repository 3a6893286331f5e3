//! Catalog service: repository access behind a read-through cache.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::repos::{
    BooksRepo, BooksWriteRepo, CategoriesRepo, CreateBookParams, RepoError, UpdateBookParams,
};
use crate::cache::{CatalogCache, book_key};
use crate::domain::entities::BookRecord;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("book `{id}` not found")]
    NotFound { id: i64 },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Coordinates book lookups and mutations.
///
/// Reads populate the injected cache; every mutation clears both regions
/// wholesale so population and eviction always agree on the key schema.
#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BooksRepo>,
    books_write: Arc<dyn BooksWriteRepo>,
    categories: Arc<dyn CategoriesRepo>,
    cache: Arc<CatalogCache>,
}

impl CatalogService {
    pub fn new(
        books: Arc<dyn BooksRepo>,
        books_write: Arc<dyn BooksWriteRepo>,
        categories: Arc<dyn CategoriesRepo>,
        cache: Arc<CatalogCache>,
    ) -> Self {
        Self {
            books,
            books_write,
            categories,
            cache,
        }
    }

    /// Exact-match lookup, cached under the composite `title-author` key.
    ///
    /// Misses are not cached; a book that does not exist yet is queried
    /// again on the next call.
    pub async fn find_book(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Option<BookRecord>, CatalogError> {
        let key = book_key(title, author);
        if let Some(book) = self.cache.get_book(&key) {
            return Ok(Some(book));
        }

        let found = self.books.find_by_title_and_author(title, author).await?;
        if let Some(book) = found.as_ref() {
            self.cache.put_book(key, book.clone());
        }
        Ok(found)
    }

    /// All books in the named category, cached under the category name.
    ///
    /// An unknown category collapses to an empty list, and empty lists are
    /// cached like any other result.
    pub async fn books_by_category(&self, name: &str) -> Result<Vec<BookRecord>, CatalogError> {
        if let Some(books) = self.cache.get_category_books(name) {
            return Ok(books);
        }

        let books = match self.categories.find_by_name(name).await? {
            Some(category) => self.books.find_by_category(category.id).await?,
            None => Vec::new(),
        };
        self.cache
            .put_category_books(name.to_string(), books.clone());
        Ok(books)
    }

    /// Persist a new book, creating its category on first use.
    pub async fn create_book(
        &self,
        title: String,
        author: String,
        category_name: String,
    ) -> Result<BookRecord, CatalogError> {
        let book = self
            .books_write
            .create_book(CreateBookParams {
                title,
                author,
                category_name,
            })
            .await?;

        self.cache.clear();
        debug!(
            target = "scaffale::catalog",
            book_id = book.id,
            category = %book.category.name,
            "created book, cleared cache regions"
        );
        Ok(book)
    }

    /// Update title, author, and category in place.
    pub async fn update_book(
        &self,
        id: i64,
        title: String,
        author: String,
        category_name: String,
    ) -> Result<BookRecord, CatalogError> {
        if self.books.find_by_id(id).await?.is_none() {
            return Err(CatalogError::NotFound { id });
        }

        let book = self
            .books_write
            .update_book(UpdateBookParams {
                id,
                title,
                author,
                category_name,
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => CatalogError::NotFound { id },
                other => CatalogError::Repo(other),
            })?;

        self.cache.clear();
        debug!(
            target = "scaffale::catalog",
            book_id = id,
            "updated book, cleared cache regions"
        );
        Ok(book)
    }

    /// Remove a book by id.
    pub async fn delete_book(&self, id: i64) -> Result<(), CatalogError> {
        if !self.books.exists(id).await? {
            return Err(CatalogError::NotFound { id });
        }

        self.books_write
            .delete_book(id)
            .await
            .map_err(|err| match err {
                RepoError::NotFound => CatalogError::NotFound { id },
                other => CatalogError::Repo(other),
            })?;

        self.cache.clear();
        debug!(
            target = "scaffale::catalog",
            book_id = id,
            "deleted book, cleared cache regions"
        );
        Ok(())
    }
}
