use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use clap::Parser;
use sqlx::SqlitePool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// modules
mod cli;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod router;
mod services;
mod session;
mod views;

#[cfg(test)]
mod test_utils;

use session::SessionStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: SessionStore,
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. .env before clap so env-backed flags see it
    dotenvy::dotenv().ok();

    // 3. run the requested command
    cli::Cli::parse().run().await
}
