//! Service-level checks that cache population and eviction stay coherent.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, AtomicUsize, Ordering},
};

use async_trait::async_trait;

use scaffale::application::catalog::{CatalogError, CatalogService};
use scaffale::application::repos::{
    BooksRepo, BooksWriteRepo, CategoriesRepo, CreateBookParams, RepoError, UpdateBookParams,
};
use scaffale::cache::{CacheConfig, CatalogCache};
use scaffale::domain::entities::{BookRecord, CategoryRecord};

/// In-memory store that counts how often each read path hits it, so the
/// tests can tell a cache hit from a fresh query.
#[derive(Default)]
struct CountingStore {
    books: Mutex<Vec<BookRecord>>,
    categories: Mutex<Vec<CategoryRecord>>,
    next_book_id: AtomicI64,
    next_category_id: AtomicI64,
    search_queries: AtomicUsize,
    category_queries: AtomicUsize,
    category_lookups: AtomicUsize,
}

impl CountingStore {
    fn resolve_or_create_category(&self, name: &str) -> CategoryRecord {
        let mut categories = self.categories.lock().expect("categories lock");
        if let Some(existing) = categories.iter().find(|c| c.name == name) {
            return existing.clone();
        }
        let category = CategoryRecord {
            id: self.next_category_id.fetch_add(1, Ordering::Relaxed) + 1,
            name: name.to_string(),
        };
        categories.push(category.clone());
        category
    }

    fn search_query_count(&self) -> usize {
        self.search_queries.load(Ordering::Relaxed)
    }

    fn category_query_count(&self) -> usize {
        self.category_queries.load(Ordering::Relaxed)
    }

    fn category_lookup_count(&self) -> usize {
        self.category_lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BooksRepo for CountingStore {
    async fn find_by_title_and_author(
        &self,
        title: &str,
        author: &str,
    ) -> Result<Option<BookRecord>, RepoError> {
        self.search_queries.fetch_add(1, Ordering::Relaxed);
        let books = self.books.lock().expect("books lock");
        Ok(books
            .iter()
            .filter(|b| b.title == title && b.author == author)
            .min_by_key(|b| b.id)
            .cloned())
    }

    async fn find_by_category(&self, category_id: i64) -> Result<Vec<BookRecord>, RepoError> {
        self.category_queries.fetch_add(1, Ordering::Relaxed);
        let books = self.books.lock().expect("books lock");
        Ok(books
            .iter()
            .filter(|b| b.category.id == category_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BookRecord>, RepoError> {
        let books = self.books.lock().expect("books lock");
        Ok(books.iter().find(|b| b.id == id).cloned())
    }

    async fn exists(&self, id: i64) -> Result<bool, RepoError> {
        let books = self.books.lock().expect("books lock");
        Ok(books.iter().any(|b| b.id == id))
    }
}

#[async_trait]
impl BooksWriteRepo for CountingStore {
    async fn create_book(&self, params: CreateBookParams) -> Result<BookRecord, RepoError> {
        let category = self.resolve_or_create_category(&params.category_name);
        let book = BookRecord {
            id: self.next_book_id.fetch_add(1, Ordering::Relaxed) + 1,
            title: params.title,
            author: params.author,
            category,
        };
        self.books.lock().expect("books lock").push(book.clone());
        Ok(book)
    }

    async fn update_book(&self, params: UpdateBookParams) -> Result<BookRecord, RepoError> {
        let category = self.resolve_or_create_category(&params.category_name);
        let mut books = self.books.lock().expect("books lock");
        let book = books
            .iter_mut()
            .find(|b| b.id == params.id)
            .ok_or(RepoError::NotFound)?;
        book.title = params.title;
        book.author = params.author;
        book.category = category;
        Ok(book.clone())
    }

    async fn delete_book(&self, id: i64) -> Result<(), RepoError> {
        let mut books = self.books.lock().expect("books lock");
        let before = books.len();
        books.retain(|b| b.id != id);
        if books.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoriesRepo for CountingStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRecord>, RepoError> {
        self.category_lookups.fetch_add(1, Ordering::Relaxed);
        let categories = self.categories.lock().expect("categories lock");
        Ok(categories.iter().find(|c| c.name == name).cloned())
    }
}

fn build_service() -> (CatalogService, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    let cache = Arc::new(CatalogCache::new(&CacheConfig::default()));
    let service = CatalogService::new(store.clone(), store.clone(), store.clone(), cache);
    (service, store)
}

#[tokio::test]
async fn repeated_search_is_served_from_cache() {
    let (service, store) = build_service();
    service
        .create_book("Dune".into(), "Herbert".into(), "fiction".into())
        .await
        .expect("create");

    let first = service.find_book("Dune", "Herbert").await.expect("find");
    let second = service.find_book("Dune", "Herbert").await.expect("find");

    assert_eq!(first, second);
    assert!(first.is_some());
    assert_eq!(store.search_query_count(), 1);
}

#[tokio::test]
async fn search_misses_are_not_cached() {
    let (service, store) = build_service();

    assert!(service.find_book("Dune", "Herbert").await.expect("find").is_none());
    assert!(service.find_book("Dune", "Herbert").await.expect("find").is_none());

    assert_eq!(store.search_query_count(), 2);
}

#[tokio::test]
async fn category_listing_is_cached_including_empty_results() {
    let (service, store) = build_service();

    // Unknown category: resolved once, then served from cache as empty.
    assert!(service.books_by_category("ghosts").await.expect("list").is_empty());
    assert!(service.books_by_category("ghosts").await.expect("list").is_empty());
    assert_eq!(store.category_lookup_count(), 1);
    assert_eq!(store.category_query_count(), 0);

    service
        .create_book("Dune".into(), "Herbert".into(), "fiction".into())
        .await
        .expect("create");

    let listed = service.books_by_category("fiction").await.expect("list");
    assert_eq!(listed.len(), 1);
    service.books_by_category("fiction").await.expect("list");
    assert_eq!(store.category_query_count(), 1);
}

#[tokio::test]
async fn update_evicts_the_title_author_entry() {
    let (service, store) = build_service();
    let created = service
        .create_book("Dune".into(), "Herbert".into(), "fiction".into())
        .await
        .expect("create");

    // Populate the books region.
    service.find_book("Dune", "Herbert").await.expect("find");
    assert_eq!(store.search_query_count(), 1);

    service
        .update_book(
            created.id,
            "Messiah".into(),
            "Herbert".into(),
            "fiction".into(),
        )
        .await
        .expect("update");

    // The stale entry must be gone: the old key queries the store again
    // and comes back empty.
    let stale = service.find_book("Dune", "Herbert").await.expect("find");
    assert!(stale.is_none());
    assert_eq!(store.search_query_count(), 2);
}

#[tokio::test]
async fn delete_evicts_both_regions() {
    let (service, store) = build_service();
    let created = service
        .create_book("Dune".into(), "Herbert".into(), "fiction".into())
        .await
        .expect("create");

    service.find_book("Dune", "Herbert").await.expect("find");
    service.books_by_category("fiction").await.expect("list");
    let searches_before = store.search_query_count();
    let listings_before = store.category_query_count();

    service.delete_book(created.id).await.expect("delete");

    assert!(service.find_book("Dune", "Herbert").await.expect("find").is_none());
    assert!(service.books_by_category("fiction").await.expect("list").is_empty());
    assert_eq!(store.search_query_count(), searches_before + 1);
    assert_eq!(store.category_query_count(), listings_before + 1);
}

#[tokio::test]
async fn update_of_missing_book_leaves_store_untouched() {
    let (service, store) = build_service();

    let result = service
        .update_book(42, "Dune".into(), "Herbert".into(), "fiction".into())
        .await;

    assert!(matches!(result, Err(CatalogError::NotFound { id: 42 })));
    assert!(store.books.lock().expect("books lock").is_empty());
    assert!(store.categories.lock().expect("categories lock").is_empty());
}

#[tokio::test]
async fn delete_of_missing_book_is_not_found() {
    let (service, _store) = build_service();

    let result = service.delete_book(7).await;
    assert!(matches!(result, Err(CatalogError::NotFound { id: 7 })));
}
