use std::{process, sync::Arc, time::Duration};

use clap::Parser;
use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

use scaffale::{
    application::{
        api_keys::{ApiKeyService, ConfiguredKey},
        authors::AuthorService,
        books::BookService,
        error::AppError,
        projections::LinkBuilder,
        repos::{AuthorsRepo, AuthorsWriteRepo, BooksRepo, BooksWriteRepo, StoreHealth},
    },
    cache::{CacheConfig, ListCache},
    config::{self, CliArgs, Command, Settings},
    infra::{
        db::{PostgresRepositories, memory::MemoryRepositories},
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};

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
    let cli = CliArgs::parse();
    let settings = config::load(&cli)?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli.command {
        Some(Command::Serve(_)) | None => run_serve(settings).await,
    }
}

/// Repository handles split per concern so services depend only on the
/// traits they use.
struct Stores {
    authors: Arc<dyn AuthorsRepo>,
    authors_write: Arc<dyn AuthorsWriteRepo>,
    books: Arc<dyn BooksRepo>,
    books_write: Arc<dyn BooksWriteRepo>,
    health: Arc<dyn StoreHealth>,
}

async fn init_stores(settings: &Settings) -> Result<Stores, AppError> {
    match settings.database.url.as_deref() {
        Some(url) => {
            let pool =
                PostgresRepositories::connect(url, settings.database.max_connections.get())
                    .await
                    .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;
            PostgresRepositories::run_migrations(&pool)
                .await
                .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

            let repos = Arc::new(PostgresRepositories::new(pool));
            info!(target = "scaffale::startup", store = "postgres", "store ready");
            Ok(Stores {
                authors: repos.clone(),
                authors_write: repos.clone(),
                books: repos.clone(),
                books_write: repos.clone(),
                health: repos,
            })
        }
        None => {
            warn!(
                target = "scaffale::startup",
                store = "memory",
                "no database url configured, data will not survive restarts"
            );
            let repos = Arc::new(MemoryRepositories::new());
            Ok(Stores {
                authors: repos.clone(),
                authors_write: repos.clone(),
                books: repos.clone(),
                books_write: repos.clone(),
                health: repos,
            })
        }
    }
}

fn build_state(settings: &Settings, stores: Stores) -> Result<ApiState, AppError> {
    let cache = Arc::new(ListCache::new(&CacheConfig {
        enabled: settings.cache.enabled,
        list_limit: settings.cache.list_limit,
    }));
    let links = LinkBuilder::new(settings.api.public_base_url.clone())
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    let keys: Vec<ConfiguredKey> = settings
        .api
        .keys
        .iter()
        .map(|key| ConfiguredKey {
            name: key.name.clone(),
            token: key.token.clone(),
            scopes: key.scopes.clone(),
        })
        .collect();
    let api_keys = Arc::new(ApiKeyService::new(keys));
    if api_keys.is_empty() {
        warn!(
            target = "scaffale::startup",
            "no api keys configured, every resource request will be rejected"
        );
    }

    let authors = Arc::new(AuthorService::new(
        stores.authors.clone(),
        stores.authors_write,
        stores.books.clone(),
        cache.clone(),
        links.clone(),
    ));
    let books = Arc::new(BookService::new(
        stores.books,
        stores.books_write,
        stores.authors,
        cache,
        links,
    ));

    Ok(ApiState {
        authors,
        books,
        api_keys,
        health: stores.health,
    })
}

async fn run_serve(settings: Settings) -> Result<(), AppError> {
    let stores = init_stores(&settings).await?;
    let state = build_state(&settings, stores)?;
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "scaffale::startup",
        addr = %settings.server.addr,
        "listening"
    );

    serve_with_drain(listener, router, settings.server.graceful_shutdown).await
}

/// Serves until a shutdown signal arrives, then drains open connections
/// for at most the configured window.
async fn serve_with_drain(
    listener: tokio::net::TcpListener,
    router: axum::Router,
    grace: Duration,
) -> Result<(), AppError> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut drain_rx = shutdown_rx.clone();
    let server = async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let mut rx = shutdown_rx;
                let _ = rx.changed().await;
                info!(target = "scaffale::shutdown", "shutdown signal received, draining");
            })
            .await
    };

    let drain_deadline = async move {
        let _ = drain_rx.changed().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
        }
        _ = drain_deadline => {
            warn!(
                target = "scaffale::shutdown",
                grace_secs = grace.as_secs(),
                "drain window elapsed, aborting open connections"
            );
            Ok(())
        }
    }
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    {
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(err) => error!(error = %err, "failed to install sigterm handler"),
            }
        };

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}
