mod auth;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing/logging
    init_tracing();

    tracing::info!("Starting classroom API server...");

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(
        "Loaded configuration: server={}:{}",
        config.server.host,
        config.server.port
    );

    // Create database connection pool and apply migrations
    let pool = db::create_pool(&config.database.url, config.database.max_connections).await?;
    db::run_migrations(&pool).await?;

    // Clean up orphaned course dependents on startup. A crash between the
    // course row and its dependents can leave strays; the sweep is idempotent.
    let report = db::cascade::sweep_orphans(&pool).await?;
    if report.total() > 0 {
        tracing::warn!(
            lectures = report.lectures,
            assignments = report.assignments,
            enrollments = report.enrollments,
            "Removed orphaned records on startup"
        );
    }

    // Initialize object-storage client for uploads
    tracing::info!("Initializing R2 client for uploads");
    let storage = storage::R2Client::new(&config.storage).await?;
    tracing::info!("R2 client initialized successfully");

    // Create app state
    let state = state::AppState::new(pool.clone(), config.clone(), storage);

    // Build router with middleware
    let app = routes::create_router(state).layer(
        ServiceBuilder::new()
            // Logging layer
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            // CORS layer
            .layer(CorsLayer::permissive()) // TODO: Configure CORS properly for production
            // Compression layer
            .layer(CompressionLayer::new()),
    );

    // Start server
    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/api/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classroom_api=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
