//! Explicit in-process cache with two named regions.
//!
//! `books`: single-book lookups keyed by the composite `title-author` key.
//! `books_by_category`: category listings keyed by category name.

mod keys;
mod lock;
mod store;

pub use keys::book_key;
pub use store::{CacheConfig, CatalogCache};
