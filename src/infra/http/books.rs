//! Book endpoint handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use scaffale_api_types::{BookResponse, BookSearchParams, BookWriteParams, CategoryResponse};

use crate::domain::entities::BookRecord;

use super::AppState;
use super::error::ApiError;

fn book_to_response(book: BookRecord) -> BookResponse {
    BookResponse {
        id: book.id,
        title: book.title,
        author: book.author,
        category: CategoryResponse {
            id: book.category.id,
            name: book.category.name,
        },
    }
}

pub async fn search_book(
    State(state): State<AppState>,
    Query(params): Query<BookSearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state
        .catalog
        .find_book(&params.title, &params.author)
        .await?;

    match book {
        Some(book) => Ok(Json(book_to_response(book))),
        None => Err(ApiError::not_found(format!(
            "no book titled `{}` by `{}`",
            params.title, params.author
        ))),
    }
}

pub async fn books_by_category(
    State(state): State<AppState>,
    Path(category_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let books = state.catalog.books_by_category(&category_name).await?;

    if books.is_empty() {
        return Err(ApiError::not_found(format!(
            "no books in category `{category_name}`"
        )));
    }

    let payload: Vec<BookResponse> = books.into_iter().map(book_to_response).collect();
    Ok(Json(payload))
}

pub async fn create_book(
    State(state): State<AppState>,
    Query(params): Query<BookWriteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state
        .catalog
        .create_book(params.title, params.author, params.category)
        .await?;

    Ok((StatusCode::CREATED, Json(book_to_response(book))))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<BookWriteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state
        .catalog
        .update_book(id, params.title, params.author, params.category)
        .await?;

    Ok(Json(book_to_response(book)))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
