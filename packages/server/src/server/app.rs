//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use extraction::{Extractor, WebSearcher};
use planner::{DiscoveryPipeline, ItineraryPlanner, PlaceCatalog, PlannerConfig};
use sqlx::PgPool;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::routes::{discover_handler, health_handler, itinerary_handler};

pub type DynSearcher = Arc<dyn WebSearcher>;
pub type DynExtractor = Arc<dyn Extractor>;
pub type DynCatalog = Arc<dyn PlaceCatalog>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: DynCatalog,
    pub discovery: Arc<DiscoveryPipeline<DynSearcher, DynExtractor>>,
    pub planner: Arc<ItineraryPlanner<DynCatalog>>,
    pub extractor: DynExtractor,
    /// Present when the catalog is backed by Postgres.
    pub db_pool: Option<PgPool>,
    pub request_timeout: Duration,
    /// Cancelled on shutdown; every request runs under a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        catalog: DynCatalog,
        searcher: DynSearcher,
        extractor: DynExtractor,
        config: PlannerConfig,
    ) -> Self {
        let discovery = DiscoveryPipeline::new(searcher, extractor.clone())
            .with_config(config.discovery);
        let planner = ItineraryPlanner::new(catalog.clone()).with_config(config.scheduler);

        Self {
            catalog,
            discovery: Arc::new(discovery),
            planner: Arc::new(planner),
            extractor,
            db_pool: None,
            request_timeout: Duration::from_secs(60),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Deadline for a request starting now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.request_timeout
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/discover", post(discover_handler))
        .route("/itineraries", post(itinerary_handler))
        // Health check
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(Extension(state)),
        )
}
