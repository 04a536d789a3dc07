// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use extraction::{OpenAIExtractor, SearcherExt, TavilyWebSearcher};
use planner::{MemoryCatalog, PostgresCatalog};
use server_core::{
    server::{build_app, AppState, DynCatalog, DynExtractor, DynSearcher},
    Config,
};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,planner=debug,extraction=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Travel Planner API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let planner_config = config
        .planner_config()
        .context("Failed to load planner configuration")?;
    tracing::info!("Configuration loaded");

    // Catalog: Postgres when DATABASE_URL is set, memory otherwise
    let (catalog, pool): (DynCatalog, Option<PgPool>) = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let catalog = PostgresCatalog::connect(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Running database migrations...");
            catalog.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Migrations complete");
            let pool = catalog.pool().clone();
            let catalog: DynCatalog = Arc::new(catalog);
            (catalog, Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory catalog");
            let catalog: DynCatalog = Arc::new(MemoryCatalog::new());
            (catalog, None)
        }
    };

    // Web searcher (Tavily) behind a shared rate limit
    let searcher: DynSearcher = Arc::new(
        TavilyWebSearcher::new(config.tavily_api_key.expose())
            .rate_limited(config.search_rps)
            .context("Invalid SEARCH_RPS")?,
    );

    let mut extractor = OpenAIExtractor::new(config.openai_api_key.expose());
    if let Some(model) = &config.openai_model {
        extractor = extractor.with_model(model.clone());
    }
    let extractor: DynExtractor = Arc::new(extractor);

    let shutdown = CancellationToken::new();
    let mut state = AppState::new(catalog, searcher, extractor, planner_config)
        .with_request_timeout(config.request_timeout)
        .with_shutdown(shutdown.clone());
    if let Some(pool) = pool {
        state = state.with_db_pool(pool);
    }

    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    let signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received shutdown signal");
        signal.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Server error")?;

    Ok(())
}
