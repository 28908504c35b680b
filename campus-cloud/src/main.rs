//! campus-cloud — course marketplace backend
//!
//! Long-running service that:
//! - Serves the course/lesson catalog with entitlement-gated content
//! - Manages user accounts, roles, and VIP membership
//! - Runs the order engine (creation, admin confirmation, cancellation)
//! - Provides bearer-token (JWT) authenticated user API

mod api;
mod auth;
mod config;
mod db;
mod entitlement;
mod error;
mod orders;
mod state;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting campus-cloud (env: {})", config.environment);

    // Initialize application state (connects to PostgreSQL, runs migrations)
    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("campus-cloud listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
