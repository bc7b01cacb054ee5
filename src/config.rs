use anyhow::{anyhow, Context, Result};
use axum_extra::extract::cookie::Key;

use crate::session::SessionStore;
use crate::{db, AppState};

/// Settings for `serve`, resolved from flags, the environment and `.env`.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub database_url: String,
    pub bind_address: String,
    pub static_dir: String,
    pub session_secret: Option<String>,
}

/// Signing key for the session cookie. Without a configured secret a random key
/// is used, which logs everyone out on restart.
pub fn cookie_key(secret: Option<&str>) -> Result<Key> {
    match secret.filter(|s| !s.is_empty()) {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|_| anyhow!("SESSION_SECRET must be at least 64 bytes long")),
        None => {
            tracing::warn!("SESSION_SECRET not set, generating a random session key");
            Ok(Key::generate())
        }
    }
}

/// Connects to the database, applies migrations and builds the shared state.
pub async fn initialize_app_state(database_url: &str, session_secret: Option<&str>) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = db::connect(database_url)
        .await
        .with_context(|| format!("failed to open database {database_url}"))?;
    db::migrate(&db).await.context("failed to run migrations")?;

    Ok(AppState {
        db,
        sessions: SessionStore::default(),
        cookie_key: cookie_key(session_secret)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secrets_are_rejected() {
        assert!(cookie_key(Some("too short")).is_err());
        assert!(cookie_key(Some(&"k".repeat(64))).is_ok());
        assert!(cookie_key(None).is_ok());
        assert!(cookie_key(Some("")).is_ok());
    }
}
