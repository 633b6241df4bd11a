use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use coachbook::config::AppConfig;
use coachbook::db;
use coachbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)
        .with_context(|| format!("failed to open database at {}", config.database_url))?;

    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN is not set, using the default token");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let app = coachbook::build_router(Arc::new(AppState::new(conn, config)));

    tracing::info!("starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
