//! Replenishment Dashboard - Backend Server
//!
//! Reads sales, stock and supplier offers from the hosted table store and
//! serves reorder recommendations grouped by supplier.

use axum::{routing::get, Router};
use shared::Policy;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use external::StoreClient;
use services::ReplenishmentService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: StoreClient,
    pub policy: Arc<Policy>,
}

impl AppState {
    pub fn replenishment_service(&self) -> ReplenishmentService {
        ReplenishmentService::new(
            self.store.clone(),
            self.config.tables.clone(),
            self.policy.as_ref().clone(),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpl_server=debug,shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Replenishment Dashboard Server");
    tracing::info!("Environment: {}", config.environment);

    let policy = config.policy.build()?;
    tracing::info!(
        policy = %policy.name,
        excluded_channels = ?policy.excluded_channels,
        "Replenishment policy loaded"
    );

    let store = StoreClient::new(&config.store)?;
    tracing::info!("Table store: {}", config.store.url);

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        policy: Arc::new(policy),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Replenishment Dashboard API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
