use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use watchlist_api::{
    config::{Config, StorageBackend},
    create_router,
    db::{self, MemoryStore, PgStore, UserRepository, WatchlistRepository},
    services::{GenreTable, MovieCatalog, TmdbCatalog},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watchlist_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (users, entries): (Arc<dyn UserRepository>, Arc<dyn WatchlistRepository>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let pool =
                    db::create_pool(&config.database_url, config.database_max_connections).await?;
                db::postgres::run_migrations(&pool).await?;
                tracing::info!("Connected to PostgreSQL and applied migrations");

                let store = Arc::new(PgStore::new(pool));
                (store.clone() as Arc<dyn UserRepository>, store as Arc<dyn WatchlistRepository>)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on shutdown");
                let store = Arc::new(MemoryStore::new());
                (store.clone() as Arc<dyn UserRepository>, store as Arc<dyn WatchlistRepository>)
            }
        };

    let genres = GenreTable::load(config.genre_table_path.as_deref())?;
    let catalog = Arc::new(TmdbCatalog::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    if genres.is_empty() {
        tracing::warn!("Genre table is empty; catalog results will carry no genre names");
    }
    tracing::info!(
        catalog = catalog.name(),
        genres = genres.len(),
        "Movie catalog configured"
    );

    let state = Arc::new(AppState::new(&config, users, entries, catalog, genres));
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
