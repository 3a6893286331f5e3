use std::{process, sync::Arc, time::Duration};

use scaffale::{
    application::{
        catalog::CatalogService,
        error::AppError,
        repos::{BooksRepo, BooksWriteRepo, CategoriesRepo},
    },
    cache::{CacheConfig, CatalogCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState, HealthRepo},
        telemetry,
    },
};
use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    run_serve(settings).await
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_app_state(repositories, &settings);
    serve_http(&settings, state).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_app_state(repositories: Arc<PostgresRepositories>, settings: &config::Settings) -> AppState {
    let books: Arc<dyn BooksRepo> = repositories.clone();
    let books_write: Arc<dyn BooksWriteRepo> = repositories.clone();
    let categories: Arc<dyn CategoriesRepo> = repositories.clone();
    let health: Arc<dyn HealthRepo> = repositories;

    let cache = Arc::new(CatalogCache::new(&CacheConfig::from(&settings.cache)));
    let catalog = CatalogService::new(books, books_write, categories, cache);

    AppState { catalog, health }
}

async fn serve_http(settings: &config::Settings, state: AppState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "scaffale::server",
        addr = %settings.server.addr,
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal(drain: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }

    info!(
        target = "scaffale::server",
        drain_seconds = drain.as_secs(),
        "Shutdown signal received, draining connections"
    );

    // Hard stop if in-flight requests outlive the configured drain window.
    tokio::spawn(async move {
        tokio::time::sleep(drain).await;
        warn!(
            target = "scaffale::server",
            "Drain window elapsed before connections finished, exiting"
        );
        process::exit(0);
    });
}
