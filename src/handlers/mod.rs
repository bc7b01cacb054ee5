pub mod auth_handler;
pub mod category_handler;
pub mod home_handler;
pub mod saved_handler;
pub mod word_handler;

use std::fmt::Display;

use askama::Template;
use axum::response::{Html, Redirect};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::auth_service;
use crate::session::Session;
use crate::views::Page;
use crate::AppState;

/// `?error=` / `?message=` carried by every redirect.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub error: Option<String>,
    pub message: Option<String>,
}

pub fn redirect_with(path: &str, key: &str, text: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, text)
        .finish();
    Redirect::to(&format!("{path}?{query}"))
}

pub fn with_message(path: &str, text: &str) -> Redirect {
    redirect_with(path, "message", text)
}

pub fn with_error(path: &str, err: &impl Display) -> Redirect {
    redirect_with(path, "error", &err.to_string())
}

/// Turns a user-facing service error into a redirect back to `path`.
/// Infrastructure errors are passed through and end up as a 500.
pub fn error_redirect(path: &str, err: AppError) -> AppResult<Redirect> {
    if err.is_internal() {
        return Err(err);
    }
    Ok(with_error(path, &err))
}

/// Ids arrive as raw path segments so a non-number can be reported instead of rejected.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Navigation and flash fields shared by every page.
pub async fn page(state: &AppState, session: &Session, flash: Flash) -> AppResult<Page> {
    let user = session.user();
    Ok(Page {
        logged_in: user.is_some(),
        is_teacher: auth_service::is_teacher(&state.db, user).await?,
        first_name: user.map(|u| u.first_name.clone()).unwrap_or_default(),
        error: flash.error.unwrap_or_default(),
        message: flash.message.unwrap_or_default(),
    })
}

pub fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}
