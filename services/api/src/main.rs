use anyhow::Result;
use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

mod config;
mod error;
mod middleware;
mod models;
mod notifier;
mod repositories;
mod routes;
mod session;
mod state;
mod validation;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Starting BookMart API service");

    let config = AppConfig::from_env()?;

    // Initialize database connection pool
    let db_config = common::database::DatabaseConfig::from_env()?;
    let pool = common::database::init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    common::database::run_migrations(&pool, &sqlx::migrate!()).await?;

    info!("BookMart API service initialized successfully");

    // CORS for the storefront origins; credentials stay on so the session
    // cookie travels
    let origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(pool, config);

    let app = routes::create_router(app_state).layer(cors);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("BookMart API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
