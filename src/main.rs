//! Bugboard - Bug Tracking API Server
//! Mission: Role-gated issue tracking over SQLite

use anyhow::{Context, Result};
use bugboard_backend::{
    api::{bugs::BugStore, projects::ProjectStore, routes::create_router, AppState},
    auth::{JwtHandler, UserStore},
    models::Config,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    info!("🚀 Bugboard API Server Starting");

    let user_store = Arc::new(UserStore::new(&config.database_path)?);
    let bug_store = Arc::new(BugStore::new(&config.database_path)?);
    let project_store = Arc::new(ProjectStore::new(&config.database_path)?);
    let jwt = Arc::new(
        JwtHandler::new(config.jwt_secret.clone()).with_ttl_hours(config.token_ttl_hours),
    );

    info!("📊 Database initialized at: {}", config.database_path);
    info!("🔐 Tokens valid for {}h", config.token_ttl_hours);

    let state = AppState {
        user_store,
        bug_store,
        project_store,
        jwt,
    };

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter overrides
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bugboard_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
