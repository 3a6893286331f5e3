pub mod books;
pub mod error;
pub mod middleware;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::application::catalog::CatalogService;
use crate::application::repos::RepoError;
use crate::infra::db::PostgresRepositories;

/// Liveness probe seam; the Postgres implementation answers with `SELECT 1`.
#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}

#[async_trait]
impl HealthRepo for PostgresRepositories {
    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check()
            .await
            .map_err(RepoError::from_persistence)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub health: Arc<dyn HealthRepo>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/books/search", get(books::search_book))
        .route(
            "/api/books/category/{category_name}",
            get(books::books_by_category),
        )
        .route("/api/books", post(books::create_book))
        .route(
            "/api/books/{id}",
            put(books::update_book).delete(books::delete_book),
        )
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
}

async fn healthz(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<&'static str, StatusCode> {
    state
        .health
        .ping()
        .await
        .map(|_| "ok")
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
}
