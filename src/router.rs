use std::path::Path;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth_handler, category_handler, home_handler, saved_handler, word_handler};
use crate::AppState;

pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(home_handler::home))
        .route("/health", get(home_handler::health))

        // accounts
        .route("/signup", get(auth_handler::signup_page).post(auth_handler::signup))
        .route("/login", get(auth_handler::login_page).post(auth_handler::login))
        .route("/logout", get(auth_handler::logout))

        // browsing and editing words
        .route("/category/:id", get(category_handler::category_page)
            .post(category_handler::add_word))
        .route("/words/:category_id/:word_id", get(word_handler::word_page)
            .post(word_handler::edit_word))

        // saved words
        .route("/saved", get(saved_handler::saved_page))
        .route("/saveword/:category_id/:word_id", get(saved_handler::save_word))
        .route("/remove_saved_word/:word_id", get(saved_handler::remove_saved_word))

        // teacher only
        .route("/addcategory", get(category_handler::add_category_page)
            .post(category_handler::add_category))
        .route("/confirmation/category/:id", get(category_handler::confirm_remove_category))
        .route("/confirmation/word/:id", get(word_handler::confirm_remove_word))
        .route("/remove/category/:id", get(category_handler::remove_category))
        .route("/remove/word/:id", get(word_handler::remove_word))

        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(home_handler::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
