//! Cache storage: LRU-bounded regions behind poison-recovering locks.

use std::num::NonZeroUsize;
use std::sync::RwLock;

use lru::LruCache;
use metrics::counter;

use crate::config::CacheSettings;
use crate::domain::entities::BookRecord;

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

const DEFAULT_BOOK_LIMIT: usize = 1024;
const DEFAULT_CATEGORY_LIMIT: usize = 256;

/// Capacity limits for the cache regions.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub book_limit: usize,
    pub category_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            book_limit: DEFAULT_BOOK_LIMIT,
            category_limit: DEFAULT_CATEGORY_LIMIT,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            book_limit: settings.book_limit,
            category_limit: settings.category_limit,
        }
    }
}

impl CacheConfig {
    fn book_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.book_limit.max(1)).unwrap_or(NonZeroUsize::MIN)
    }

    fn category_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.category_limit.max(1)).unwrap_or(NonZeroUsize::MIN)
    }
}

/// The two named cache regions shared across requests.
///
/// Entries are cloned out on read; interior locks are never held across
/// await points. Lock poisoning is recovered rather than propagated.
pub struct CatalogCache {
    books: RwLock<LruCache<String, BookRecord>>,
    books_by_category: RwLock<LruCache<String, Vec<BookRecord>>>,
}

impl CatalogCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            books: RwLock::new(LruCache::new(config.book_limit_non_zero())),
            books_by_category: RwLock::new(LruCache::new(config.category_limit_non_zero())),
        }
    }

    pub fn get_book(&self, key: &str) -> Option<BookRecord> {
        let hit = rw_write(&self.books, SOURCE, "get_book").get(key).cloned();
        match hit {
            Some(_) => counter!("scaffale_cache_books_hit_total").increment(1),
            None => counter!("scaffale_cache_books_miss_total").increment(1),
        }
        hit
    }

    pub fn put_book(&self, key: String, book: BookRecord) {
        rw_write(&self.books, SOURCE, "put_book").put(key, book);
    }

    pub fn get_category_books(&self, name: &str) -> Option<Vec<BookRecord>> {
        let hit = rw_write(&self.books_by_category, SOURCE, "get_category_books")
            .get(name)
            .cloned();
        match hit {
            Some(_) => counter!("scaffale_cache_categories_hit_total").increment(1),
            None => counter!("scaffale_cache_categories_miss_total").increment(1),
        }
        hit
    }

    pub fn put_category_books(&self, name: String, books: Vec<BookRecord>) {
        rw_write(&self.books_by_category, SOURCE, "put_category_books").put(name, books);
    }

    /// Clear both regions. Every mutation funnels through here.
    pub fn clear(&self) {
        rw_write(&self.books, SOURCE, "clear.books").clear();
        rw_write(&self.books_by_category, SOURCE, "clear.books_by_category").clear();
        counter!("scaffale_cache_clear_total").increment(1);
    }

    pub fn len_books(&self) -> usize {
        rw_read(&self.books, SOURCE, "len_books").len()
    }

    pub fn len_categories(&self) -> usize {
        rw_read(&self.books_by_category, SOURCE, "len_categories").len()
    }
}
