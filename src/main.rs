use std::sync::Arc;

use anyhow::Context;

mod app;
mod auth;
mod config;
mod error;
mod state;
mod store;
#[cfg(test)]
mod test_support;
mod todos;

use crate::{config::AppConfig, state::AppState, store::PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "todo_api=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    let state = AppState::new(config, Arc::new(PgStore::new(pool)))?;
    let app = app::build_app(state);

    app::serve(app).await
}
