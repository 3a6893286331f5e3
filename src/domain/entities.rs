//! Catalog records as persisted in the store.

/// A named grouping entity referenced by books.
///
/// Categories are looked up by name and created on first use; the name is
/// not enforced unique at the store level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
}

/// A catalog record with title, author, and its owning category.
///
/// The category is always materialized alongside the book; queries join
/// `categories` rather than resolving the reference lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: CategoryRecord,
}
