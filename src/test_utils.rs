use std::str::FromStr;

use axum::Router;
use axum_extra::extract::cookie::Key;
use axum_test::{TestServer, TestServerConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::models::account::{SessionUser, SignupForm};
use crate::models::word::WordForm;
use crate::router::create_router;
use crate::services::auth_service;
use crate::session::SessionStore;
use crate::{db, AppState};

pub const TEST_PASSWORD: &str = "abcdefgh";

/// In-memory SQLite with migrations applied.
///
/// Every connection to `sqlite::memory:` is its own database, so the pool is pinned
/// to a single connection that is never recycled.
pub async fn setup_test_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Invalid in-memory database url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to connect to in-memory database");

    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

pub async fn setup_test_app_state() -> AppState {
    AppState {
        db: setup_test_db().await,
        sessions: SessionStore::default(),
        cookie_key: Key::generate(),
    }
}

pub async fn setup_test_app() -> (Router, AppState) {
    let state = setup_test_app_state().await;
    let app = create_router(state.clone(), "static");
    (app, state)
}

/// Test server that keeps cookies between requests, like a browser.
pub async fn setup_test_server() -> (TestServer, AppState) {
    let (app, state) = setup_test_app().await;
    let config = TestServerConfig {
        save_cookies: true,
        ..TestServerConfig::default()
    };
    let server = TestServer::new_with_config(app, config).expect("Failed to start test server");
    (server, state)
}

pub fn signup_form(fname: &str, lname: &str, email: &str, teacher: bool) -> SignupForm {
    SignupForm {
        fname: fname.to_string(),
        mname: String::new(),
        lname: lname.to_string(),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        password2: TEST_PASSWORD.to_string(),
        teacher_or_student: if teacher { "teacher" } else { "student" }.to_string(),
    }
}

async fn create_account(pool: &SqlitePool, email: &str, teacher: bool) -> SessionUser {
    auth_service::signup(pool, &signup_form("Aroha", "Smith", email, teacher))
        .await
        .expect("Failed to create test account");
    auth_service::authenticate(pool, email, TEST_PASSWORD)
        .await
        .expect("Failed to log test account in")
}

pub async fn create_teacher(pool: &SqlitePool, email: &str) -> SessionUser {
    create_account(pool, email, true).await
}

pub async fn create_student(pool: &SqlitePool, email: &str) -> SessionUser {
    create_account(pool, email, false).await
}

pub fn word_form(maori: &str, english: &str) -> WordForm {
    WordForm {
        maori: maori.to_string(),
        english: english.to_string(),
        year_level: "3".to_string(),
        definition: format!("the word for {english}"),
        category: None,
    }
}
