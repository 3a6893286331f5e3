//! Key schemas for the cache regions.
//!
//! Eviction is region-wide, so keys only ever need to agree between the
//! two population sites and their lookups.

/// Composite key for the `books` region: `"{title}-{author}"`.
///
/// The separator is part of the key's identity, not a parseable delimiter;
/// titles containing `-` simply produce longer keys.
pub fn book_key(title: &str, author: &str) -> String {
    format!("{title}-{author}")
}
