use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Json,
};
use serde::Serialize;

use super::{page, render, with_error, Flash};
use crate::error::AppResult;
use crate::services::category_service;
use crate::session::Session;
use crate::views::HomeTemplate;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub active_sessions: usize,
}

/// Home page with the category list.
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Query(flash): Query<Flash>,
) -> AppResult<Html<String>> {
    let categories = category_service::list_categories(&state.db).await?;
    let page = page(&state, &session, flash).await?;
    render(&HomeTemplate { page, categories })
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::error!("!!! Health check could not reach the database: {}", e);
            "disconnected"
        }
    };
    let status = if database == "connected" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if status == StatusCode::OK { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        active_sessions: state.sessions.len().await,
    };
    (status, Json(body))
}

/// Unknown paths go back home.
pub async fn not_found() -> Redirect {
    with_error("/", &"Page not found")
}
