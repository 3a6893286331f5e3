//! Wire types shared between the Scaffale server and API clients.

use serde::{Deserialize, Serialize};

/// Category as serialized in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

/// Book as serialized in API responses: `{id, title, author, category}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: CategoryResponse,
}

/// Query parameters for `GET /api/books/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSearchParams {
    pub title: String,
    pub author: String,
}

/// Query parameters for `POST /api/books` and `PUT /api/books/{id}`.
///
/// All three fields are required; empty strings are accepted as values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookWriteParams {
    pub title: String,
    pub author: String,
    pub category: String,
}
